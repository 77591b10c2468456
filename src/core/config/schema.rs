//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$RLS_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/rls/config.toml`
//! 3. `~/.rls/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing so a bad API URL is reported
//! against the file it came from rather than at the first request.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::forge::github::parse_api_base;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// owner = "octocat"
/// api_base = "https://github.example.com/api/v3/"
/// interactive = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Default repository owner
    pub owner: Option<String>,

    /// API base URL for GitHub Enterprise
    pub api_base: Option<String>,

    /// Default interactive mode
    pub interactive: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(owner) = &self.owner {
            if owner.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "owner cannot be empty".to_string(),
                ));
            }
        }

        if let Some(api_base) = &self.api_base {
            parse_api_base(api_base).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid api_base: {}", e))
            })?;
        }

        Ok(())
    }
}
