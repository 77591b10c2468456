//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the **single doorway** to git in rls. It reads history
//! for commit classification and looks up the defaults for owner, repository
//! and token in git config and remotes.
//!
//! # Example
//!
//! ```ignore
//! use rls_release::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for commit in git.commits()? {
//!     let commit = commit?;
//!     println!("{} {}", commit.short_oid(), commit.summary);
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// The repository has no commits yet.
    #[error("repository has no commits")]
    EmptyRepo,

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(e: git2::Error) -> Self {
        GitError::Internal {
            message: e.message().to_string(),
        }
    }
}

/// Information about a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Full hex object id
    pub oid: String,
    /// First line of the message
    pub summary: String,
    /// Full message
    pub message: String,
}

impl CommitInfo {
    /// Abbreviated object id (7 characters).
    pub fn short_oid(&self) -> &str {
        &self.oid[..self.oid.len().min(7)]
    }
}

/// The Git interface.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Ok(Self { repo })
    }

    /// Walk history from `HEAD`, newest first.
    ///
    /// The walk is lazy, so a caller that stops early does not pay for the
    /// rest of the history.
    pub fn commits(&self) -> Result<CommitWalk<'_>, GitError> {
        match self.repo.head() {
            Ok(_) => {}
            Err(e)
                if matches!(
                    e.code(),
                    git2::ErrorCode::UnbornBranch | git2::ErrorCode::NotFound
                ) =>
            {
                return Err(GitError::EmptyRepo)
            }
            Err(e) => return Err(e.into()),
        }

        let mut walk = self.repo.revwalk()?;
        walk.push_head()?;
        walk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        Ok(CommitWalk {
            repo: &self.repo,
            walk,
        })
    }

    /// Read a string value from the repository's git config.
    ///
    /// Includes the global and system scopes. Returns `None` if unset.
    pub fn config_string(&self, key: &str) -> Result<Option<String>, GitError> {
        let config = self.repo.config()?;
        read_config_string(&config, key)
    }

    /// Read a string value from the global git config.
    ///
    /// Used when no repository is available.
    pub fn global_config_string(key: &str) -> Result<Option<String>, GitError> {
        let config = git2::Config::open_default()?;
        read_config_string(&config, key)
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Parse a remote URL into (owner, repo).
    ///
    /// Works for any host so GitHub Enterprise remotes resolve too:
    /// - `https://github.com/owner/repo.git`
    /// - `ssh://git@github.example.com/owner/repo.git`
    /// - `git@github.com:owner/repo.git`
    ///
    /// # Example
    ///
    /// ```
    /// use rls_release::git::Git;
    ///
    /// assert_eq!(
    ///     Git::parse_remote_owner_repo("git@github.com:owner/repo.git"),
    ///     Some(("owner".to_string(), "repo".to_string()))
    /// );
    /// assert_eq!(Git::parse_remote_owner_repo("not a url"), None);
    /// ```
    pub fn parse_remote_owner_repo(url: &str) -> Option<(String, String)> {
        let url = url.trim();

        let path = if let Some((_, rest)) = url.split_once("://") {
            // scheme://[user@]host[:port]/path
            rest.split_once('/')?.1
        } else if let Some((host, path)) = url.split_once(':') {
            // scp-style user@host:path
            if host.is_empty() || host.contains('/') {
                return None;
            }
            path
        } else {
            return None;
        };

        Self::parse_owner_repo(path)
    }

    /// Parse ".../owner/repo.git" or ".../owner/repo" into (owner, repo).
    fn parse_owner_repo(path: &str) -> Option<(String, String)> {
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (rest, repo) = path.rsplit_once('/')?;
        let owner = rest.rsplit('/').next()?;

        if owner.is_empty() || repo.is_empty() {
            return None;
        }

        Some((owner.to_string(), repo.to_string()))
    }
}

fn read_config_string(config: &git2::Config, key: &str) -> Result<Option<String>, GitError> {
    match config.get_string(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Lazy iterator over commits, see [`Git::commits`].
pub struct CommitWalk<'repo> {
    repo: &'repo git2::Repository,
    walk: git2::Revwalk<'repo>,
}

impl Iterator for CommitWalk<'_> {
    type Item = Result<CommitInfo, GitError>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = match self.walk.next()? {
            Ok(oid) => oid,
            Err(e) => return Some(Err(e.into())),
        };

        Some(
            self.repo
                .find_commit(oid)
                .map(|commit| CommitInfo {
                    oid: oid.to_string(),
                    summary: commit.summary().unwrap_or("").to_string(),
                    message: commit.message().unwrap_or("").to_string(),
                })
                .map_err(GitError::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn commit(repo: &git2::Repository, message: &str) {
        let sig = git2::Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parent = repo
            .head()
            .ok()
            .and_then(|h| h.target())
            .map(|oid| repo.find_commit(oid).unwrap());
        let parents: Vec<&git2::Commit> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .unwrap();
    }

    mod parse_remote {
        use super::*;

        #[test]
        fn ssh_with_git_suffix() {
            assert_eq!(
                Git::parse_remote_owner_repo("git@github.com:owner/repo.git"),
                Some(("owner".into(), "repo".into()))
            );
        }

        #[test]
        fn https_without_git_suffix() {
            assert_eq!(
                Git::parse_remote_owner_repo("https://github.com/owner/repo"),
                Some(("owner".into(), "repo".into()))
            );
        }

        #[test]
        fn ssh_scheme_enterprise_host_with_port() {
            assert_eq!(
                Git::parse_remote_owner_repo("ssh://git@github.example.com:2222/team/tool.git"),
                Some(("team".into(), "tool".into()))
            );
        }

        #[test]
        fn https_with_trailing_slash() {
            assert_eq!(
                Git::parse_remote_owner_repo("https://github.com/owner/repo/"),
                Some(("owner".into(), "repo".into()))
            );
        }

        #[test]
        fn repo_with_dots() {
            assert_eq!(
                Git::parse_remote_owner_repo("https://github.com/owner/my.repo.git"),
                Some(("owner".into(), "my.repo".into()))
            );
        }

        #[test]
        fn local_path_is_rejected() {
            assert_eq!(Git::parse_remote_owner_repo("/srv/git/repo.git"), None);
            assert_eq!(Git::parse_remote_owner_repo("repo"), None);
        }

        #[test]
        fn missing_owner_is_rejected() {
            assert_eq!(Git::parse_remote_owner_repo("https://github.com/repo"), None);
        }
    }

    mod repository {
        use super::*;

        #[test]
        fn open_outside_repo_fails() {
            let dir = TempDir::new().unwrap();
            assert!(matches!(
                Git::open(dir.path()),
                Err(GitError::NotARepo { .. })
            ));
        }

        #[test]
        fn commits_on_empty_repo() {
            let dir = TempDir::new().unwrap();
            git2::Repository::init(dir.path()).unwrap();
            let git = Git::open(dir.path()).unwrap();
            assert!(matches!(git.commits(), Err(GitError::EmptyRepo)));
        }

        #[test]
        fn commits_newest_first() {
            let dir = TempDir::new().unwrap();
            let repo = git2::Repository::init(dir.path()).unwrap();
            commit(&repo, "first commit");
            commit(&repo, "second commit\n\nwith a body");

            let git = Git::open(dir.path()).unwrap();
            let commits: Vec<CommitInfo> = git.commits().unwrap().map(|c| c.unwrap()).collect();

            assert_eq!(commits.len(), 2);
            assert_eq!(commits[0].summary, "second commit");
            assert_eq!(commits[0].message, "second commit\n\nwith a body");
            assert_eq!(commits[1].summary, "first commit");
            assert_eq!(commits[0].short_oid().len(), 7);
            assert!(commits[0].oid.starts_with(commits[0].short_oid()));
        }

        #[test]
        fn open_from_subdirectory() {
            let dir = TempDir::new().unwrap();
            git2::Repository::init(dir.path()).unwrap();
            let sub = dir.path().join("nested");
            std::fs::create_dir(&sub).unwrap();
            assert!(Git::open(&sub).is_ok());
        }

        #[test]
        fn remote_url_lookup() {
            let dir = TempDir::new().unwrap();
            let repo = git2::Repository::init(dir.path()).unwrap();
            repo.remote("origin", "git@github.com:owner/repo.git")
                .unwrap();

            let git = Git::open(dir.path()).unwrap();
            assert_eq!(
                git.remote_url("origin").unwrap().as_deref(),
                Some("git@github.com:owner/repo.git")
            );
            assert_eq!(git.remote_url("upstream").unwrap(), None);
        }

        #[test]
        fn config_string_reads_repo_scope() {
            let dir = TempDir::new().unwrap();
            let repo = git2::Repository::init(dir.path()).unwrap();
            repo.config()
                .unwrap()
                .set_str("github.user", "octocat")
                .unwrap();

            let git = Git::open(dir.path()).unwrap();
            assert_eq!(
                git.config_string("github.user").unwrap().as_deref(),
                Some("octocat")
            );
            assert_eq!(git.config_string("rls.unset-key").unwrap(), None);
        }
    }
}
