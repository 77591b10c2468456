//! engine::reconcile
//!
//! Converges a desired release with what exists on the forge.
//!
//! # Decision order
//!
//! The first matching branch wins:
//!
//! ```text
//! draft?            -> create                                  (CreatedDraft)
//! lookup(tag) Err   -> fail, nothing else is called            (Lookup)
//! lookup NotFound   -> create, warn if recreate was asked for  (Created)
//! Found, !recreate  -> return existing, nothing else is called (Reused)
//! Found, recreate   -> delete release -> delete tag -> settle -> create (Recreated)
//! ```
//!
//! # Invariants
//!
//! - Calls are strictly sequential; a step runs only if the previous one
//!   succeeded.
//! - Nothing is retried. Every failure ends the reconcile and names the step.
//! - The settle delay between tag deletion and recreation is unconditional.
//!   The forge gives no signal that the tag deletion has propagated.
//! - Every remote call and the settle delay yield to the cancellation token.

use std::future::Future;
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::forge::{Forge, ForgeError, ReleaseId, ReleaseLookup, ReleaseRequest, RemoteRelease};

/// Wait between deleting a tag and recreating a release on it.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);

/// A step of the reconcile, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Lookup,
    Create,
    DeleteRelease,
    DeleteTag,
    Settle,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Lookup => write!(f, "lookup"),
            Step::Create => write!(f, "create"),
            Step::DeleteRelease => write!(f, "delete-release"),
            Step::DeleteTag => write!(f, "delete-tag"),
            Step::Settle => write!(f, "settle"),
        }
    }
}

/// Errors from reconciling a release.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Existence of the release could not be determined.
    #[error("lookup of release '{tag}' failed: {source}")]
    Lookup { tag: String, source: ForgeError },

    /// The forge rejected the create.
    #[error("create of release '{tag}' failed: {source}")]
    Create { tag: String, source: ForgeError },

    /// The existing release could not be deleted. Nothing was changed.
    #[error("delete-release of release {id} (tag '{tag}') failed: {source}")]
    DeleteRelease {
        tag: String,
        id: ReleaseId,
        source: ForgeError,
    },

    /// The release was deleted but its tag was not.
    #[error(
        "delete-tag of '{tag}' failed after release {id} was already deleted; \
         the tag still exists and must be deleted manually before retrying: {source}"
    )]
    DeleteTag {
        tag: String,
        id: ReleaseId,
        source: ForgeError,
    },

    /// The caller cancelled the reconcile.
    #[error("cancelled during {step}")]
    Cancelled { step: Step },
}

impl ReconcileError {
    /// The step that failed.
    pub fn step(&self) -> Step {
        match self {
            ReconcileError::Lookup { .. } => Step::Lookup,
            ReconcileError::Create { .. } => Step::Create,
            ReconcileError::DeleteRelease { .. } => Step::DeleteRelease,
            ReconcileError::DeleteTag { .. } => Step::DeleteTag,
            ReconcileError::Cancelled { step } => *step,
        }
    }

    /// Whether the remote was left half-deleted (release gone, tag present).
    pub fn is_partial(&self) -> bool {
        matches!(self, ReconcileError::DeleteTag { .. })
    }
}

/// Which branch produced the release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Draft created without looking for an existing release.
    CreatedDraft,
    /// No release existed; a new one was created.
    Created,
    /// A release existed and was returned unchanged.
    Reused,
    /// A release existed and was deleted along with its tag, then recreated.
    Recreated,
}

impl std::fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileAction::CreatedDraft => write!(f, "created as draft"),
            ReconcileAction::Created => write!(f, "created"),
            ReconcileAction::Reused => write!(f, "reused"),
            ReconcileAction::Recreated => write!(f, "recreated"),
        }
    }
}

/// Non-fatal conditions noticed while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    /// Recreate was requested but no release existed for the tag.
    NothingToRecreate { tag: String },
}

impl std::fmt::Display for ReconcileWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReconcileWarning::NothingToRecreate { tag } => write!(
                f,
                "recreate requested but no release exists for '{}'; creating a new one",
                tag
            ),
        }
    }
}

/// Successful reconcile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// The release as it now exists on the forge.
    pub release: RemoteRelease,
    /// Which branch produced it.
    pub action: ReconcileAction,
    /// Non-fatal warnings.
    pub warnings: Vec<ReconcileWarning>,
}

impl Reconciled {
    fn new(release: RemoteRelease, action: ReconcileAction) -> Self {
        Self {
            release,
            action,
            warnings: Vec::new(),
        }
    }
}

/// Decides between create, reuse and recreate for a release request.
pub struct ReleaseReconciler<'a> {
    forge: &'a dyn Forge,
    settle_delay: Duration,
}

impl<'a> ReleaseReconciler<'a> {
    /// Reconciler over `forge` with the default settle delay.
    pub fn new(forge: &'a dyn Forge) -> Self {
        Self {
            forge,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Make the forge hold a release for `request`.
    ///
    /// With `recreate`, an existing release for the tag is deleted together
    /// with its tag and created again from `request`. Without it, an
    /// existing release is returned as is.
    pub async fn reconcile(
        &self,
        request: &ReleaseRequest,
        recreate: bool,
        cancel: &CancellationToken,
    ) -> Result<Reconciled, ReconcileError> {
        let tag = request.tag();

        if request.is_draft() {
            debug!("release '{}' is a draft, skipping existence check", tag);
            let release = self.create(request, cancel).await?;
            return Ok(Reconciled::new(release, ReconcileAction::CreatedDraft));
        }

        debug!("looking up release for tag '{}' on {}", tag, self.forge.name());
        let lookup = guarded(cancel, Step::Lookup, self.forge.get_release_by_tag(tag))
            .await?
            .map_err(|source| ReconcileError::Lookup {
                tag: tag.to_string(),
                source,
            })?;

        let existing = match lookup {
            ReleaseLookup::NotFound => {
                let mut warnings = Vec::new();
                if recreate {
                    let warning = ReconcileWarning::NothingToRecreate {
                        tag: tag.to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                let release = self.create(request, cancel).await?;
                return Ok(Reconciled {
                    release,
                    action: ReconcileAction::Created,
                    warnings,
                });
            }
            ReleaseLookup::Found(existing) => existing,
        };

        if !recreate {
            info!(
                "release {} already exists for '{}', reusing it",
                existing.id, tag
            );
            return Ok(Reconciled::new(existing, ReconcileAction::Reused));
        }

        let release = self.recreate(request, &existing, cancel).await?;
        Ok(Reconciled::new(release, ReconcileAction::Recreated))
    }

    /// Delete `existing` and its tag, wait for the forge to settle, create again.
    async fn recreate(
        &self,
        request: &ReleaseRequest,
        existing: &RemoteRelease,
        cancel: &CancellationToken,
    ) -> Result<RemoteRelease, ReconcileError> {
        let tag = request.tag();
        let id = existing.id;

        info!("deleting release {} for '{}'", id, tag);
        guarded(cancel, Step::DeleteRelease, self.forge.delete_release(id))
            .await?
            .map_err(|source| ReconcileError::DeleteRelease {
                tag: tag.to_string(),
                id,
                source,
            })?;

        info!("deleting tag '{}'", tag);
        guarded(cancel, Step::DeleteTag, self.forge.delete_tag(tag))
            .await?
            .map_err(|source| ReconcileError::DeleteTag {
                tag: tag.to_string(),
                id,
                source,
            })?;

        debug!(
            "waiting {:?} for tag deletion to propagate",
            self.settle_delay
        );
        guarded(cancel, Step::Settle, tokio::time::sleep(self.settle_delay)).await?;

        self.create(request, cancel).await
    }

    async fn create(
        &self,
        request: &ReleaseRequest,
        cancel: &CancellationToken,
    ) -> Result<RemoteRelease, ReconcileError> {
        info!("creating release '{}'", request.tag());
        guarded(cancel, Step::Create, self.forge.create_release(request))
            .await?
            .map_err(|source| ReconcileError::Create {
                tag: request.tag().to_string(),
                source,
            })
    }
}

/// Run `fut` unless `cancel` fires first.
async fn guarded<F: Future>(
    cancel: &CancellationToken,
    step: Step,
    fut: F,
) -> Result<F::Output, ReconcileError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ReconcileError::Cancelled { step }),
        out = fut => Ok(out),
    }
}
