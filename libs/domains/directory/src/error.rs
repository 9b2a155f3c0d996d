//! Error types for the directory domain.

use thiserror::Error;

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Errors that can occur in the directory domain.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The backing document store failed.
    #[error("Directory store error: {0}")]
    Store(String),

    /// Patient record not found.
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// Auth provider error.
    #[error("Auth provider error: {0}")]
    Auth(String),
}
