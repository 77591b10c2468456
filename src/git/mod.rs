//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. No other module imports
//! `git2`. We use the `git2` crate exclusively (no shelling out to the git
//! CLI).
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Walking commit history for classification
//! - Reading git config defaults (`github.user`, `user.name`, `github.token`)
//! - Remote URL parsing

mod interface;

pub use interface::{CommitInfo, CommitWalk, Git, GitError};
