//! rls - classify commits and publish a GitHub release
//!
//! rls walks the local git history, asks which commits are major changes,
//! minor changes or patches, renders release notes from the answers and
//! publishes them as a GitHub release for a tag. An existing release for
//! the tag is reused, or deleted together with its tag and recreated when
//! asked to.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, maps exit codes)
//! - [`engine`] - Release reconciliation against the forge
//! - [`core`] - Commit classification and configuration
//! - [`git`] - Single interface for all Git operations
//! - [`forge`] - Abstraction for the remote release API (GitHub)
//! - [`ui`] - Prompts, output and release-note rendering
//!
//! # Correctness Invariants
//!
//! 1. At most one create is issued per run
//! 2. A tag is only deleted after its release was deleted
//! 3. A cancelled run stops before the next forge call

pub mod cli;
pub mod core;
pub mod engine;
pub mod forge;
pub mod git;
pub mod ui;
