//! forge::mock
//!
//! Mock forge implementation for deterministic testing.
//!
//! # Design
//!
//! The mock forge stores releases in memory keyed by tag, records every
//! call in order, and can be told to fail a specific operation. Tests use
//! the recorded operations to check which remote calls happened, and in what
//! order.
//!
//! # Example
//!
//! ```
//! use rls_release::forge::mock::MockForge;
//! use rls_release::forge::{Forge, ReleaseLookup, ReleaseRequest};
//!
//! # tokio_test::block_on(async {
//! let forge = MockForge::new();
//!
//! let request = ReleaseRequest::new("v1.0.0").unwrap();
//! let release = forge.create_release(&request).await.unwrap();
//! assert_eq!(release.id.0, 1);
//!
//! let found = forge.get_release_by_tag("v1.0.0").await.unwrap();
//! assert_eq!(found, ReleaseLookup::Found(release));
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::traits::{Forge, ForgeError, ReleaseId, ReleaseLookup, ReleaseRequest, RemoteRelease};
use crate::git::CommitInfo;

/// Mock forge for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockForge {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockForgeInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockForgeInner {
    /// Stored releases by tag.
    releases: HashMap<String, RemoteRelease>,
    /// Tags that exist on the remote.
    tags: BTreeSet<String>,
    /// Commit history on the default branch, newest first.
    commits: Vec<CommitInfo>,
    /// Next release id to assign.
    next_id: u64,
    /// Method to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail create_release with the given error.
    CreateRelease(ForgeError),
    /// Fail get_release_by_tag with the given error.
    GetReleaseByTag(ForgeError),
    /// Fail delete_release with the given error.
    DeleteRelease(ForgeError),
    /// Fail delete_tag with the given error.
    DeleteTag(ForgeError),
    /// Fail list_commits with the given error.
    ListCommits(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    CreateRelease { tag: String, draft: bool },
    GetReleaseByTag { tag: String },
    DeleteRelease { id: ReleaseId },
    DeleteTag { tag: String },
    ListCommits { sha: Option<String> },
}

impl MockForge {
    /// Create a new empty mock forge.
    pub fn new() -> Self {
        Self::with_releases(Vec::new())
    }

    /// Create a mock forge with pre-existing releases (and their tags).
    pub fn with_releases(releases: Vec<RemoteRelease>) -> Self {
        let next_id = releases.iter().map(|r| r.id.0).max().unwrap_or(0) + 1;
        let tags = releases.iter().map(|r| r.tag_name.clone()).collect();
        let releases = releases
            .into_iter()
            .map(|r| (r.tag_name.clone(), r))
            .collect();

        Self {
            inner: Arc::new(Mutex::new(MockForgeInner {
                releases,
                tags,
                commits: Vec::new(),
                next_id,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use rls_release::forge::mock::{FailOn, MockForge};
    /// use rls_release::forge::ForgeError;
    ///
    /// let forge = MockForge::new().fail_on(FailOn::CreateRelease(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Set the commit history returned by `list_commits`, newest first.
    pub fn with_commits(self, commits: Vec<CommitInfo>) -> Self {
        self.lock().commits = commits;
        self
    }

    /// Get all recorded operations, oldest first.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Get the stored release for a tag (for test verification).
    pub fn release(&self, tag: &str) -> Option<RemoteRelease> {
        self.lock().releases.get(tag).cloned()
    }

    /// Whether the remote has a tag ref (for test verification).
    pub fn has_tag(&self, tag: &str) -> bool {
        self.lock().tags.contains(tag)
    }

    fn lock(&self) -> MutexGuard<'_, MockForgeInner> {
        // A poisoned lock only means another test thread panicked
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        self.lock().operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, op: &MockOperation) -> Option<ForgeError> {
        match (&self.lock().fail_on, op) {
            (Some(FailOn::CreateRelease(e)), MockOperation::CreateRelease { .. })
            | (Some(FailOn::GetReleaseByTag(e)), MockOperation::GetReleaseByTag { .. })
            | (Some(FailOn::DeleteRelease(e)), MockOperation::DeleteRelease { .. })
            | (Some(FailOn::DeleteTag(e)), MockOperation::DeleteTag { .. })
            | (Some(FailOn::ListCommits(e)), MockOperation::ListCommits { .. }) => Some(e.clone()),
            _ => None,
        }
    }

    /// Record `op` and return the configured failure for it, if any.
    fn enter(&self, op: MockOperation) -> Result<(), ForgeError> {
        let failure = self.check_fail(&op);
        self.record(op);
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Forge for MockForge {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_release(&self, request: &ReleaseRequest) -> Result<RemoteRelease, ForgeError> {
        self.enter(MockOperation::CreateRelease {
            tag: request.tag().to_string(),
            draft: request.is_draft(),
        })?;

        let mut inner = self.lock();
        if !request.is_draft() && inner.releases.contains_key(request.tag()) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: "Validation Failed: tag_name already_exists".into(),
            });
        }

        let id = ReleaseId(inner.next_id);
        inner.next_id += 1;

        let release = RemoteRelease {
            id,
            tag_name: request.tag().to_string(),
            html_url: format!(
                "https://github.com/mock/repo/releases/tag/{}",
                request.tag()
            ),
            draft: request.is_draft(),
        };

        // Drafts do not publish a tag until released
        if !request.is_draft() {
            inner.tags.insert(request.tag().to_string());
            inner
                .releases
                .insert(request.tag().to_string(), release.clone());
        }
        Ok(release)
    }

    async fn get_release_by_tag(&self, tag: &str) -> Result<ReleaseLookup, ForgeError> {
        self.enter(MockOperation::GetReleaseByTag {
            tag: tag.to_string(),
        })?;

        Ok(match self.lock().releases.get(tag) {
            Some(release) => ReleaseLookup::Found(release.clone()),
            None => ReleaseLookup::NotFound,
        })
    }

    async fn delete_release(&self, id: ReleaseId) -> Result<(), ForgeError> {
        self.enter(MockOperation::DeleteRelease { id })?;

        let mut inner = self.lock();
        let before = inner.releases.len();
        inner.releases.retain(|_, r| r.id != id);
        if inner.releases.len() == before {
            return Err(ForgeError::ApiError {
                status: 404,
                message: "Not Found".into(),
            });
        }
        Ok(())
    }

    async fn delete_tag(&self, tag: &str) -> Result<(), ForgeError> {
        self.enter(MockOperation::DeleteTag {
            tag: tag.to_string(),
        })?;

        if self.lock().tags.remove(tag) {
            Ok(())
        } else {
            Err(ForgeError::ApiError {
                status: 422,
                message: "Reference does not exist".into(),
            })
        }
    }

    async fn list_commits(&self, sha: Option<&str>) -> Result<Vec<CommitInfo>, ForgeError> {
        self.enter(MockOperation::ListCommits {
            sha: sha.map(str::to_string),
        })?;

        // One linear history; `sha` picks the starting point within it
        let inner = self.lock();
        let commits = &inner.commits;
        let start = sha
            .and_then(|sha| commits.iter().position(|c| c.oid == sha))
            .unwrap_or(0);
        Ok(commits[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(id: u64, tag: &str) -> RemoteRelease {
        RemoteRelease {
            id: ReleaseId(id),
            tag_name: tag.to_string(),
            html_url: format!("https://github.com/mock/repo/releases/tag/{}", tag),
            draft: false,
        }
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let forge = MockForge::with_releases(vec![release(7, "v1.0.0")]);
        let created = forge
            .create_release(&ReleaseRequest::new("v1.1.0").unwrap())
            .await
            .unwrap();
        assert_eq!(created.id, ReleaseId(8));
        assert!(forge.has_tag("v1.1.0"));
    }

    #[tokio::test]
    async fn create_conflicts_on_existing_tag() {
        let forge = MockForge::with_releases(vec![release(1, "v1.0.0")]);
        let err = forge
            .create_release(&ReleaseRequest::new("v1.0.0").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 422, .. }));
    }

    #[tokio::test]
    async fn drafts_are_not_indexed_by_tag() {
        let forge = MockForge::new();
        let req = ReleaseRequest::new("v1.0.0").unwrap().with_draft(true);
        forge.create_release(&req).await.unwrap();
        forge.create_release(&req).await.unwrap();

        assert_eq!(
            forge.get_release_by_tag("v1.0.0").await.unwrap(),
            ReleaseLookup::NotFound
        );
        assert!(!forge.has_tag("v1.0.0"));
    }

    #[tokio::test]
    async fn delete_release_keeps_tag() {
        let forge = MockForge::with_releases(vec![release(3, "v1.0.0")]);
        forge.delete_release(ReleaseId(3)).await.unwrap();
        assert!(forge.release("v1.0.0").is_none());
        assert!(forge.has_tag("v1.0.0"));

        forge.delete_tag("v1.0.0").await.unwrap();
        assert!(!forge.has_tag("v1.0.0"));
    }

    #[tokio::test]
    async fn delete_missing_release_fails() {
        let forge = MockForge::new();
        assert!(forge.delete_release(ReleaseId(99)).await.is_err());
        assert!(forge.delete_tag("v0.0.1").await.is_err());
    }

    fn commit(oid: &str, message: &str) -> CommitInfo {
        CommitInfo {
            oid: oid.to_string(),
            summary: message.to_string(),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn list_commits_from_start() {
        let forge = MockForge::new().with_commits(vec![
            commit("c3", "third"),
            commit("c2", "second"),
            commit("c1", "first"),
        ]);

        let all = forge.list_commits(None).await.unwrap();
        assert_eq!(all.len(), 3);

        let from_c2 = forge.list_commits(Some("c2")).await.unwrap();
        let oids: Vec<&str> = from_c2.iter().map(|c| c.oid.as_str()).collect();
        assert_eq!(oids, ["c2", "c1"]);

        assert_eq!(
            forge.operations(),
            vec![
                MockOperation::ListCommits { sha: None },
                MockOperation::ListCommits {
                    sha: Some("c2".into())
                },
            ]
        );
    }

    #[tokio::test]
    async fn failures_are_recorded() {
        let forge = MockForge::new().fail_on(FailOn::GetReleaseByTag(ForgeError::RateLimited));
        let err = forge.get_release_by_tag("v1.0.0").await.unwrap_err();
        assert_eq!(err, ForgeError::RateLimited);
        assert_eq!(
            forge.operations(),
            vec![MockOperation::GetReleaseByTag {
                tag: "v1.0.0".into()
            }]
        );
    }
}
