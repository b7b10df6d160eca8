//! Fixture error types

use thiserror::Error;

/// Errors that can occur while generating or harvesting fixture files
#[derive(Debug, Error)]
pub enum FixtureError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The attribute file exists but is not a flat key-value mapping
    #[error("Invalid attribute file: {0}")]
    InvalidAttributes(String),

    /// Terraform could not be run or reported a failure
    #[error("Terraform error: {0}")]
    Terraform(String),
}

impl FixtureError {
    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::Io(format!("{}: {}", context, err))
    }
}

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;
