//! Error types for the fnc crate.

use thiserror::Error;

use crate::path::Path;
use crate::Value;

/// Errors that can occur when resolving paths, calling operators or
/// building retry policies.
#[derive(Debug, Error)]
pub enum FncError {
    /// A path segment could not be resolved in raise-on-missing mode.
    #[error("path {path} not found: no value at segment {segment}")]
    PathNotFound { path: Path, segment: Value },

    /// An operator received an argument it cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A retry setting is out of range.
    #[error("invalid retry config: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}

/// Result type for fnc operations.
pub type Result<T> = std::result::Result<T, FncError>;
