//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Usage
//!
//! ```text
//! rls [OPTIONS] TAG [PATH]
//! ```
//!
//! `PATH` is the repository whose history is classified. Without it the
//! current directory is used, and when that is not inside a repository the
//! commits are listed from the forge instead.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use thiserror::Error;

/// Positional arguments that clap accepted but that do not form `TAG [PATH]`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    #[error("missing TAG argument")]
    MissingTag,

    #[error("expected TAG [PATH], got {0} arguments")]
    TooManyArguments(usize),
}

/// rls - classify commits and publish a GitHub release
#[derive(Parser, Debug)]
#[command(name = "rls")]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// Print version
    #[arg(short = 'v', short_alias = 'V', long, action = clap::ArgAction::Version)]
    pub version: Option<bool>,

    /// Repository owner name
    #[arg(short = 'u', long, visible_alias = "username", value_name = "OWNER")]
    pub owner: Option<String>,

    /// Repository name
    #[arg(short = 'r', long = "repository", value_name = "REPOSITORY")]
    pub repository: Option<String>,

    /// GitHub API token (defaults to $GITHUB_TOKEN or git config github.token)
    #[arg(short = 't', long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Branch or commit the tag is created from
    #[arg(short = 'c', long, value_name = "COMMITISH")]
    pub commitish: Option<String>,

    /// Release name (defaults to TAG)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Create the release as a draft
    #[arg(long)]
    pub draft: bool,

    /// Mark the release as a prerelease
    #[arg(long)]
    pub prerelease: bool,

    /// Delete an existing release and its tag, then create it again
    #[arg(long, visible_aliases = ["delete", "update"])]
    pub recreate: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long)]
    pub quiet: bool,

    /// Always prompt, even when stdin is not a terminal
    #[arg(long = "interactive", conflicts_with = "no_interactive")]
    pub force_interactive: bool,

    /// Disable interactive prompts
    #[arg(long)]
    pub no_interactive: bool,

    /// TAG and optional PATH
    #[arg(value_name = "TAG [PATH]")]
    pub positional: Vec<String>,
}

/// The validated positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub tag: String,
    /// Repository path, if one was given.
    pub path: Option<PathBuf>,
}

impl Target {
    /// Where to look for the local repository.
    pub fn repo_path(&self) -> &Path {
        self.path.as_deref().unwrap_or(Path::new("."))
    }
}

impl Cli {
    /// Split the positionals into tag and repository path.
    pub fn target(&self) -> Result<Target, ArgsError> {
        match self.positional.as_slice() {
            [] => Err(ArgsError::MissingTag),
            [tag] => Ok(Target {
                tag: tag.clone(),
                path: None,
            }),
            [tag, path] => Ok(Target {
                tag: tag.clone(),
                path: Some(PathBuf::from(path)),
            }),
            more => Err(ArgsError::TooManyArguments(more.len())),
        }
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.force_interactive {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rls").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn tag_only_defaults_path() {
        let target = parse(&["v1.0.0"]).target().unwrap();
        assert_eq!(target.tag, "v1.0.0");
        assert_eq!(target.path, None);
        assert_eq!(target.repo_path(), Path::new("."));
    }

    #[test]
    fn tag_and_path() {
        let target = parse(&["v1.0.0", "../repo"]).target().unwrap();
        assert_eq!(target.path, Some(PathBuf::from("../repo")));
        assert_eq!(target.repo_path(), Path::new("../repo"));
    }

    #[test]
    fn positional_count_checked() {
        assert_eq!(parse(&[]).target(), Err(ArgsError::MissingTag));
        assert_eq!(
            parse(&["a", "b", "c"]).target(),
            Err(ArgsError::TooManyArguments(3))
        );
    }

    #[test]
    fn short_flags() {
        let cli = parse(&["-u", "octo", "-r", "cat", "-t", "tok", "-c", "main", "-q", "v1"]);
        assert_eq!(cli.owner.as_deref(), Some("octo"));
        assert_eq!(cli.repository.as_deref(), Some("cat"));
        assert_eq!(cli.token.as_deref(), Some("tok"));
        assert_eq!(cli.commitish.as_deref(), Some("main"));
        assert!(cli.quiet);
        assert!(!cli.interactive());
    }

    #[test]
    fn recreate_aliases() {
        assert!(parse(&["--recreate", "v1"]).recreate);
        assert!(parse(&["--delete", "v1"]).recreate);
        assert!(parse(&["--update", "v1"]).recreate);
        assert!(!parse(&["v1"]).recreate);
    }

    #[test]
    fn username_alias() {
        let cli = parse(&["--username", "octo", "v1"]);
        assert_eq!(cli.owner.as_deref(), Some("octo"));
    }

    #[test]
    fn release_flags() {
        let cli = parse(&["--draft", "--prerelease", "--name", "First", "v1"]);
        assert!(cli.draft);
        assert!(cli.prerelease);
        assert_eq!(cli.name.as_deref(), Some("First"));
    }

    #[test]
    fn interactive_flag_forces_prompts() {
        assert!(parse(&["--interactive", "-q", "v1"]).interactive());
        assert!(Cli::try_parse_from(["rls", "--interactive", "--no-interactive", "v1"]).is_err());
    }

    #[test]
    fn version_short_flags() {
        for flag in ["-v", "-V", "--version"] {
            let err = Cli::try_parse_from(["rls", flag]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
        }
    }

    #[test]
    fn unknown_flag_rejected() {
        let err = Cli::try_parse_from(["rls", "--bogus", "v1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
