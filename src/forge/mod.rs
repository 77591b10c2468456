//! forge
//!
//! Abstraction for the remote hosting service that stores releases.
//!
//! # Architecture
//!
//! The `Forge` trait defines the four release operations the reconciler
//! needs: create, look up by tag, delete, and delete the tag ref. It also
//! lists commits, for runs without a local checkout. The reconciler only
//! ever sees `&dyn Forge`, so it runs the same against GitHub and against
//! the in-memory mock.
//!
//! # Modules
//!
//! - `traits`: Core `Forge` trait and request/response types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: Mock implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use rls_release::forge::github::{GitHubConfig, GitHubForge};
//! use rls_release::forge::{Forge, ReleaseRequest};
//!
//! let forge = GitHubForge::new(GitHubConfig::new("owner", "repo", token))?;
//! let request = ReleaseRequest::new("v1.0.0")?.with_body("notes");
//! let release = forge.create_release(&request).await?;
//! println!("Created release {}: {}", release.id, release.html_url);
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
