//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive commit classification
//! - [`output`] - Output formatting and display
//! - [`release_notes`] - Release body rendering
//!
//! # Design
//!
//! All terminal output and prompts go through this module so the quiet and
//! non-interactive modes are handled in one place.

pub mod output;
pub mod prompts;
pub mod release_notes;
