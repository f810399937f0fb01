//! Error types for apiver

use thiserror::Error;

/// Result type alias for apiver operations
pub type Result<T, E = VersionError> = std::result::Result<T, E>;

/// Errors raised while building versioned routes
///
/// Only construction can fail. Once a [`VersionMatcher`](crate::VersionMatcher)
/// exists, an unknown or malformed request version is routed to the fallback
/// handler instead of surfacing as an error.
#[derive(Debug, Error)]
pub enum VersionError {
    /// A version string could not be parsed
    #[error("invalid version `{input}`: {reason}")]
    InvalidVersion { input: String, reason: &'static str },

    /// A constraint expression could not be parsed
    #[error("invalid version constraint `{input}`: {reason}")]
    InvalidConstraint { input: String, reason: String },

    /// Environment configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),
}

impl VersionError {
    pub(crate) fn version(input: &str, reason: &'static str) -> Self {
        Self::InvalidVersion {
            input: input.to_string(),
            reason,
        }
    }

    pub(crate) fn constraint(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConstraint {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
