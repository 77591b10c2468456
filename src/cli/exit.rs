//! cli::exit
//!
//! Process exit codes.

use crate::cli::args::ArgsError;
use crate::core::config::ConfigError;
use crate::forge::EmptyTag;

/// Exit status of an `rls` run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok,
    Error,
    ParseFlags,
    BadArgs,
    TokenNotFound,
    RepoNotFound,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Ok => 0,
            ExitCode::Error => 10,
            ExitCode::ParseFlags => 11,
            ExitCode::BadArgs => 12,
            ExitCode::TokenNotFound => 13,
            ExitCode::RepoNotFound => 14,
        }
    }

    /// Exit code for a failed run.
    pub fn for_error(err: &anyhow::Error) -> Self {
        if err.downcast_ref::<ArgsError>().is_some() || err.downcast_ref::<EmptyTag>().is_some() {
            return ExitCode::BadArgs;
        }
        match err.downcast_ref::<ConfigError>() {
            Some(ConfigError::TokenNotFound) => ExitCode::TokenNotFound,
            Some(ConfigError::OwnerNotFound | ConfigError::RepoNotFound) => ExitCode::RepoNotFound,
            _ => ExitCode::Error,
        }
    }
}
