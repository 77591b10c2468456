//! engine
//!
//! Release reconciliation: the only part of rls that talks to the forge.
//!
//! # Architecture
//!
//! The CLI layer gathers a [`ReleaseRequest`](crate::forge::ReleaseRequest)
//! from local git history and flags, then hands it to the
//! [`ReleaseReconciler`], which decides between creating, reusing and
//! recreating the release on the forge.
//!
//! # Example
//!
//! ```ignore
//! use rls_release::engine::ReleaseReconciler;
//! use tokio_util::sync::CancellationToken;
//!
//! let reconciler = ReleaseReconciler::new(&forge);
//! let outcome = reconciler.reconcile(&request, recreate, &CancellationToken::new()).await?;
//! println!("{} {}", outcome.action, outcome.release.html_url);
//! ```

pub mod reconcile;

pub use reconcile::{
    ReconcileAction, ReconcileError, ReconcileWarning, Reconciled, ReleaseReconciler, Step,
    DEFAULT_SETTLE_DELAY,
};

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}
