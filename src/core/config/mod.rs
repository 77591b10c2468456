//! core::config
//!
//! Configuration loading and forge scope resolution.
//!
//! # Overview
//!
//! rls has one optional configuration file (user scope). Everything that
//! identifies the forge scope (owner, repository, token, API base) is
//! resolved from several sources, first hit wins:
//!
//! | value    | sources, in order                                                  |
//! |----------|--------------------------------------------------------------------|
//! | owner    | `--owner` flag, config `owner`, git `github.user`, git `user.name` |
//! | repo     | `--repository` flag, owner/repo of the `origin` remote             |
//! | token    | `--token` flag, `$GITHUB_TOKEN`, git `github.token`                |
//! | api base | `$GITHUB_API`, config `api_base`, public GitHub                    |
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$RLS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/rls/config.toml`
//! 3. `~/.rls/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use rls_release::core::config::{process_env, Config};
//!
//! let config = Config::load(&process_env).unwrap();
//! println!("Interactive: {}", config.interactive());
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::forge::github::{GitHubConfig, DEFAULT_API_BASE};
use crate::git::Git;

/// Environment variable holding the API token.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Environment variable overriding the API base URL (GitHub Enterprise).
pub const ENV_GITHUB_API: &str = "GITHUB_API";

/// Environment variable pointing at an explicit config file.
pub const ENV_RLS_CONFIG: &str = "RLS_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("repository owner name not found")]
    OwnerNotFound,

    #[error("repository name not found")]
    RepoNotFound,

    #[error("GitHub API token not found")]
    TokenNotFound,
}

/// Lookup function for environment variables.
///
/// Injected so resolution can be tested without touching the process
/// environment.
pub type EnvLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read a variable from the process environment. Empty values count as unset.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// Missing config files are not an error (defaults are used).
    pub fn load(env: EnvLookup<'_>) -> Result<Self, ConfigError> {
        match Self::find_global(env) {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        debug!("loaded config from {}", path.display());
        Ok(Self {
            global,
            global_path: Some(path.to_path_buf()),
        })
    }

    /// Locate the global config file.
    fn find_global(env: EnvLookup<'_>) -> Option<PathBuf> {
        // 1. Check $RLS_CONFIG
        if let Some(path) = env(ENV_RLS_CONFIG).map(PathBuf::from) {
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/rls/config.toml
        if let Some(xdg_home) = env("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("rls/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.rls/config.toml
        let path = dirs::home_dir()?.join(".rls/config.toml");
        path.exists().then_some(path)
    }

    /// Check if interactive mode is enabled by default.
    ///
    /// Defaults to `true` if not configured.
    pub fn interactive(&self) -> bool {
        self.global.interactive.unwrap_or(true)
    }

    /// Get the path to the loaded global config file.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct ForgeOverrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub token: Option<String>,
}

/// Resolve the forge scope from flags, environment, config file and git.
///
/// `git` is the repository the release is built from, if one is open;
/// without it only the global git config is consulted.
///
/// # Errors
///
/// `OwnerNotFound`, `RepoNotFound` or `TokenNotFound`, checked in that order.
pub fn resolve_forge_config(
    overrides: &ForgeOverrides,
    config: &Config,
    git: Option<&Git>,
    env: EnvLookup<'_>,
) -> Result<GitHubConfig, ConfigError> {
    let git_config = |key: &str| -> Option<String> {
        let value = match git {
            Some(git) => git.config_string(key),
            None => Git::global_config_string(key),
        };
        value.unwrap_or_else(|e| {
            debug!("could not read git config '{}': {}", key, e);
            None
        })
    };

    let owner = non_empty(overrides.owner.clone())
        .or_else(|| config.global.owner.clone())
        .or_else(|| git_config("github.user"))
        .or_else(|| git_config("user.name"))
        .ok_or(ConfigError::OwnerNotFound)?;

    let repo = non_empty(overrides.repo.clone())
        .or_else(|| git.and_then(origin_repo_name))
        .ok_or(ConfigError::RepoNotFound)?;

    let token = non_empty(overrides.token.clone())
        .or_else(|| env(ENV_GITHUB_TOKEN))
        .or_else(|| git_config("github.token"))
        .ok_or(ConfigError::TokenNotFound)?;

    let api_base = env(ENV_GITHUB_API)
        .or_else(|| config.global.api_base.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

    debug!("resolved forge scope {}/{} at {}", owner, repo, api_base);
    Ok(GitHubConfig::new(owner, repo, token).with_api_base(api_base))
}

/// Repository name from the `origin` remote URL.
fn origin_repo_name(git: &Git) -> Option<String> {
    let url = git.remote_url("origin").ok().flatten()?;
    Git::parse_remote_owner_repo(&url).map(|(_, repo)| repo)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    /// Repository with `github.user`, `github.token` and an origin remote set locally.
    fn repo_with_defaults(dir: &TempDir) -> Git {
        let repo = git2::Repository::init(dir.path()).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("github.user", "git-user").unwrap();
        config.set_str("github.token", "git-token").unwrap();
        repo.remote("origin", "https://github.com/someone/from-remote.git")
            .unwrap();
        Git::open(dir.path()).unwrap()
    }

    mod loading {
        use super::*;

        #[test]
        fn explicit_path_via_env() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("custom.toml");
            fs::write(&path, "owner = \"octocat\"\ninteractive = false\n").unwrap();

            let path_str = path.to_string_lossy().to_string();
            let env = env_from(&[(ENV_RLS_CONFIG, &path_str)]);
            let config = Config::load(&env).unwrap();

            assert_eq!(config.global.owner.as_deref(), Some("octocat"));
            assert!(!config.interactive());
            assert_eq!(config.loaded_from(), Some(path.as_path()));
        }

        #[test]
        fn xdg_location() {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("rls")).unwrap();
            fs::write(
                dir.path().join("rls/config.toml"),
                "api_base = \"https://ghe.example.com/api/v3/\"\n",
            )
            .unwrap();

            let xdg = dir.path().to_string_lossy().to_string();
            let env = env_from(&[("XDG_CONFIG_HOME", &xdg)]);
            let config = Config::load(&env).unwrap();

            assert_eq!(
                config.global.api_base.as_deref(),
                Some("https://ghe.example.com/api/v3/")
            );
        }

        #[test]
        fn parse_error_names_file() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.toml");
            fs::write(&path, "owner = [").unwrap();

            let err = Config::load_from(&path).unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { .. }));
            assert!(err.to_string().contains("config.toml"));
        }

        #[test]
        fn invalid_value_rejected() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("config.toml");
            fs::write(&path, "api_base = \"not a url\"\n").unwrap();

            assert!(matches!(
                Config::load_from(&path),
                Err(ConfigError::InvalidValue(_))
            ));
        }

        #[test]
        fn missing_file_via_load_from() {
            let dir = TempDir::new().unwrap();
            let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
            assert!(matches!(err, ConfigError::ReadError { .. }));
        }
    }

    mod resolution {
        use super::*;

        #[test]
        fn flags_win() {
            let dir = TempDir::new().unwrap();
            let git = repo_with_defaults(&dir);
            let overrides = ForgeOverrides {
                owner: Some("flag-owner".into()),
                repo: Some("flag-repo".into()),
                token: Some("flag-token".into()),
            };
            let env = env_from(&[(ENV_GITHUB_TOKEN, "env-token")]);

            let resolved =
                resolve_forge_config(&overrides, &Config::default(), Some(&git), &env).unwrap();

            assert_eq!(resolved.owner, "flag-owner");
            assert_eq!(resolved.repo, "flag-repo");
            assert_eq!(resolved.token, "flag-token");
            assert_eq!(resolved.api_base, DEFAULT_API_BASE);
        }

        #[test]
        fn falls_back_to_env_config_and_git() {
            let dir = TempDir::new().unwrap();
            let git = repo_with_defaults(&dir);
            let config = Config {
                global: GlobalConfig {
                    owner: Some("config-owner".into()),
                    api_base: Some("https://config.example.com/api/v3/".into()),
                    interactive: None,
                },
                global_path: None,
            };
            let env = env_from(&[
                (ENV_GITHUB_TOKEN, "env-token"),
                (ENV_GITHUB_API, "https://env.example.com/api/v3/"),
            ]);

            let resolved =
                resolve_forge_config(&ForgeOverrides::default(), &config, Some(&git), &env)
                    .unwrap();

            assert_eq!(resolved.owner, "config-owner");
            assert_eq!(resolved.repo, "from-remote");
            assert_eq!(resolved.token, "env-token");
            assert_eq!(resolved.api_base, "https://env.example.com/api/v3/");
        }

        #[test]
        fn git_config_is_last_resort() {
            let dir = TempDir::new().unwrap();
            let git = repo_with_defaults(&dir);
            let env = env_from(&[]);

            let resolved = resolve_forge_config(
                &ForgeOverrides::default(),
                &Config::default(),
                Some(&git),
                &env,
            )
            .unwrap();

            assert_eq!(resolved.owner, "git-user");
            assert_eq!(resolved.token, "git-token");
        }

        #[test]
        fn empty_flags_are_ignored() {
            let dir = TempDir::new().unwrap();
            let git = repo_with_defaults(&dir);
            let overrides = ForgeOverrides {
                owner: Some(String::new()),
                repo: Some(" ".into()),
                token: None,
            };
            let env = env_from(&[]);

            let resolved =
                resolve_forge_config(&overrides, &Config::default(), Some(&git), &env).unwrap();

            assert_eq!(resolved.owner, "git-user");
            assert_eq!(resolved.repo, "from-remote");
        }

        #[test]
        fn missing_repo_without_remote() {
            let dir = TempDir::new().unwrap();
            git2::Repository::init(dir.path()).unwrap();
            let git = Git::open(dir.path()).unwrap();
            let overrides = ForgeOverrides {
                owner: Some("owner".into()),
                ..Default::default()
            };
            let env = env_from(&[(ENV_GITHUB_TOKEN, "t")]);

            let err =
                resolve_forge_config(&overrides, &Config::default(), Some(&git), &env).unwrap_err();
            assert!(matches!(err, ConfigError::RepoNotFound));
        }

        #[test]
        fn missing_token_reported_after_owner_and_repo() {
            let dir = TempDir::new().unwrap();
            git2::Repository::init(dir.path()).unwrap();
            let git = Git::open(dir.path()).unwrap();
            let overrides = ForgeOverrides {
                owner: Some("owner".into()),
                repo: Some("repo".into()),
                token: None,
            };
            let env = env_from(&[]);

            // The surrounding user config may define github.token
            match resolve_forge_config(&overrides, &Config::default(), Some(&git), &env) {
                Err(err) => assert!(matches!(err, ConfigError::TokenNotFound)),
                Ok(resolved) => assert!(!resolved.token.is_empty()),
            }
        }
    }
}
