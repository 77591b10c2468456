//! forge::traits
//!
//! Forge trait definition for managing releases on a remote hosting service.
//!
//! # Design
//!
//! The `Forge` trait is async because forge operations involve network I/O.
//! It exposes four release operations plus a read-only commit listing, each
//! scoped to the owner/repo the implementation was constructed with. Every method maps
//! transport and status-code outcomes into a small typed result so that
//! callers never inspect raw HTTP responses.
//!
//! The lookup is tri-state: `Ok(Found)`, `Ok(NotFound)`, or `Err(_)`.
//! "Definitely absent" and "could not tell" must never be confused.
//!
//! # Example
//!
//! ```ignore
//! use rls_release::forge::{Forge, ReleaseLookup, ReleaseRequest};
//!
//! async fn show(forge: &dyn Forge) -> Result<(), ForgeError> {
//!     match forge.get_release_by_tag("v1.0.0").await? {
//!         ReleaseLookup::Found(release) => println!("{}", release.html_url),
//!         ReleaseLookup::NotFound => println!("no release yet"),
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::git::CommitInfo;

/// Errors from forge operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForgeError {
    /// The forge could not be constructed from the given parameters.
    #[error("invalid forge configuration: {0}")]
    InvalidConfig(String),

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned a status the operation does not accept.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Opaque identifier of a release on the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReleaseId(pub u64);

impl std::fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error building a [`ReleaseRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("release tag must not be empty")]
pub struct EmptyTag;

/// Desired release, as requested by the caller.
///
/// The tag is the unique release identifier and is guaranteed non-empty.
/// Fields are private so a request cannot change after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    tag: String,
    name: String,
    target_commitish: String,
    draft: bool,
    prerelease: bool,
    body: String,
}

impl ReleaseRequest {
    /// Create a request for `tag`. The release name defaults to the tag.
    pub fn new(tag: impl Into<String>) -> Result<Self, EmptyTag> {
        let tag = tag.into();
        if tag.trim().is_empty() {
            return Err(EmptyTag);
        }
        Ok(Self {
            name: tag.clone(),
            tag,
            target_commitish: String::new(),
            draft: false,
            prerelease: false,
            body: String::new(),
        })
    }

    /// Set the release name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the commitish the tag is created from (empty means default branch).
    pub fn with_target_commitish(mut self, commitish: impl Into<String>) -> Self {
        self.target_commitish = commitish.into();
        self
    }

    /// Mark the release as a draft.
    pub fn with_draft(mut self, draft: bool) -> Self {
        self.draft = draft;
        self
    }

    /// Mark the release as a prerelease.
    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// Set the release notes.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_commitish(&self) -> &str {
        &self.target_commitish
    }

    pub fn is_draft(&self) -> bool {
        self.draft
    }

    pub fn is_prerelease(&self) -> bool {
        self.prerelease
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// A release as it exists on the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRelease {
    /// Remote identifier, used for deletion
    pub id: ReleaseId,
    /// Tag the release is anchored to
    pub tag_name: String,
    /// Web URL for viewing the release
    pub html_url: String,
    /// Whether the release is a draft
    pub draft: bool,
}

/// Result of looking up a release by tag.
///
/// `NotFound` is a sentinel: the remote confirmed no release exists for the
/// tag. Failures to find out are reported as `Err(ForgeError)` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseLookup {
    /// A release exists for the tag.
    Found(RemoteRelease),
    /// The remote confirmed there is no release for the tag.
    NotFound,
}

/// The Forge trait for managing releases on a remote hosting service.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// No method retries. Mutating operations succeed only on the exact status
/// the service documents for success (201 for create, 204 for deletes);
/// anything else is an error.
#[async_trait]
pub trait Forge: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Create a release.
    ///
    /// Calling this twice for the same tag typically fails with a conflict,
    /// reported as `ApiError` like any other rejection.
    async fn create_release(&self, request: &ReleaseRequest) -> Result<RemoteRelease, ForgeError>;

    /// Fetch the release for `tag`.
    async fn get_release_by_tag(&self, tag: &str) -> Result<ReleaseLookup, ForgeError>;

    /// Delete a release by id. The tag it points at is left in place.
    async fn delete_release(&self, id: ReleaseId) -> Result<(), ForgeError>;

    /// Delete the tag ref `refs/tags/<tag>`.
    async fn delete_tag(&self, tag: &str) -> Result<(), ForgeError>;

    /// List commits newest first, starting at `sha` or at the default
    /// branch when `None`. Only the first page is returned.
    ///
    /// Used as the commit source when no local checkout is available.
    async fn list_commits(&self, sha: Option<&str>) -> Result<Vec<CommitInfo>, ForgeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_name_to_tag() {
        let req = ReleaseRequest::new("v1.2.0").unwrap();
        assert_eq!(req.tag(), "v1.2.0");
        assert_eq!(req.name(), "v1.2.0");
        assert_eq!(req.target_commitish(), "");
        assert!(!req.is_draft());
        assert!(!req.is_prerelease());
        assert_eq!(req.body(), "");
    }

    #[test]
    fn request_builder_sets_fields() {
        let req = ReleaseRequest::new("v2.0.0")
            .unwrap()
            .with_name("Big one")
            .with_target_commitish("main")
            .with_draft(true)
            .with_prerelease(true)
            .with_body("notes");

        assert_eq!(req.name(), "Big one");
        assert_eq!(req.target_commitish(), "main");
        assert!(req.is_draft());
        assert!(req.is_prerelease());
        assert_eq!(req.body(), "notes");
    }

    #[test]
    fn request_rejects_blank_tag() {
        assert_eq!(ReleaseRequest::new(""), Err(EmptyTag));
        assert_eq!(ReleaseRequest::new("  \t"), Err(EmptyTag));
    }

    #[test]
    fn release_id_display() {
        assert_eq!(ReleaseId(42).to_string(), "42");
    }

    #[test]
    fn forge_error_display() {
        assert_eq!(
            ForgeError::InvalidConfig("missing owner".into()).to_string(),
            "invalid forge configuration: missing owner"
        );
        assert_eq!(
            ForgeError::AuthFailed("expired token".into()).to_string(),
            "authentication failed: expired token"
        );
        assert_eq!(ForgeError::RateLimited.to_string(), "rate limited");
        assert_eq!(
            ForgeError::ApiError {
                status: 422,
                message: "Validation Failed".into()
            }
            .to_string(),
            "API error: 422 - Validation Failed"
        );
        assert_eq!(
            ForgeError::NetworkError("connection refused".into()).to_string(),
            "network error: connection refused"
        );
    }
}
