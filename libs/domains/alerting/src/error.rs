//! Error types for the alerting domain.

use thiserror::Error;

/// Result type for alerting operations.
pub type AlertingResult<T> = Result<T, AlertingError>;

/// Errors that can occur in the alerting domain.
///
/// Per-recipient channel failures are not errors here; they are
/// aggregated into the fan-out report. These variants cover the cases
/// where the workflow as a whole cannot proceed.
#[derive(Debug, Error)]
pub enum AlertingError {
    /// No assignment slot resolved to a contactable staff member. The
    /// caller should direct the patient to a manual escalation path.
    #[error("No assigned staff found")]
    NoAssignedStaff,

    /// Patient record not found.
    #[error("Patient not found: {0}")]
    PatientNotFound(String),

    /// Invalid input; a programming error, never retried.
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<validator::ValidationErrors> for AlertingError {
    fn from(err: validator::ValidationErrors) -> Self {
        AlertingError::Validation(err.to_string())
    }
}
