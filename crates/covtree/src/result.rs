//! Result and error types for covtree.

use thiserror::Error;

/// Result type for covtree operations
pub type TreeResult<T> = Result<T, CovTreeError>;

/// Errors that can occur while building or traversing coverage trees
#[derive(Debug, Error)]
pub enum CovTreeError {
    /// A node or tree implementation did not provide a required accessor
    #[error("Unimplemented method: {method} must be provided by the node implementation")]
    Unimplemented {
        /// Name of the missing accessor
        method: &'static str,
    },

    /// Coverage data handed to a summarizer was malformed or absent
    #[error("Invalid coverage data: {message}")]
    InvalidCoverageInput {
        /// Error message
        message: String,
    },

    /// A visitor callback reported a failure
    #[error("Visitor callback failed: {message}")]
    VisitorCallback {
        /// Error message
        message: String,
    },

    /// Attempted to merge coverage records of two different files
    #[error("Cannot merge coverage for {actual} into {expected}")]
    CoverageMismatch {
        /// Path of the record being merged into
        expected: String,
        /// Path of the record being merged
        actual: String,
    },

    /// Invalid configuration (watermarks, context options)
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CovTreeError {
    /// Create an unimplemented-accessor error
    #[must_use]
    pub const fn unimplemented(method: &'static str) -> Self {
        Self::Unimplemented { method }
    }

    /// Create an invalid coverage input error
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidCoverageInput {
            message: message.into(),
        }
    }

    /// Create a visitor callback error
    #[must_use]
    pub fn visitor(message: impl Into<String>) -> Self {
        Self::VisitorCallback {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
