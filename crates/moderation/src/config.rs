//! Listing query configuration

use crate::limit::{DEFAULT_LIMIT, MAX_LIMIT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The maximum page size must be positive
    #[error("Maximum limit must be at least 1")]
    ZeroMaxLimit,

    /// The default page size must fall inside `[1, max_limit]`
    #[error("Default limit {default} is outside 1..={max}")]
    DefaultOutOfRange {
        /// Configured default
        default: u32,
        /// Configured maximum
        max: u32,
    },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Bounds and policies applied when turning query parameters into a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModerationQueryConfig {
    /// Page size when the client sends none or an invalid one
    #[serde(default = "default_limit")]
    pub default_limit: u32,
    /// Largest page size a client may request
    #[serde(default = "default_max_limit")]
    pub max_limit: u32,
    /// Reject malformed cursors instead of restarting from the first page
    #[serde(default)]
    pub reject_invalid_cursor: bool,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn default_max_limit() -> u32 {
    MAX_LIMIT
}

impl Default for ModerationQueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
            reject_invalid_cursor: false,
        }
    }
}

impl ModerationQueryConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default page size
    pub fn default_limit(mut self, limit: u32) -> Self {
        self.default_limit = limit;
        self
    }

    /// Set the maximum page size
    pub fn max_limit(mut self, limit: u32) -> Self {
        self.max_limit = limit;
        self
    }

    /// Set whether malformed cursors are rejected
    pub fn reject_invalid_cursor(mut self, reject: bool) -> Self {
        self.reject_invalid_cursor = reject;
        self
    }

    /// Check that the limits are consistent
    pub fn validate(&self) -> Result<()> {
        if self.max_limit == 0 {
            return Err(ConfigError::ZeroMaxLimit);
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::DefaultOutOfRange {
                default: self.default_limit,
                max: self.max_limit,
            });
        }
        Ok(())
    }
}
