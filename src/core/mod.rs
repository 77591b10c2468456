//! core
//!
//! Domain types and configuration for rls.
//!
//! # Modules
//!
//! - [`changes`] - Commit classification into release-note categories
//! - [`config`] - Configuration schema, loading and forge scope resolution

pub mod changes;
pub mod config;
