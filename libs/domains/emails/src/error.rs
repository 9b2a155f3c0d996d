//! Error types for the email domain.

use thiserror::Error;

/// Result type for email operations.
pub type EmailResult<T> = Result<T, EmailError>;

/// Errors that can occur in the email domain.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email transport provider error.
    #[error("Email provider error: {0}")]
    Provider(String),

    /// Template rendering error.
    #[error("Template rendering error: {0}")]
    Template(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Recipient address missing or malformed.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

impl From<reqwest::Error> for EmailError {
    fn from(err: reqwest::Error) -> Self {
        EmailError::Provider(err.to_string())
    }
}

impl From<handlebars::RenderError> for EmailError {
    fn from(err: handlebars::RenderError) -> Self {
        EmailError::Template(err.to_string())
    }
}

impl From<core_config::ConfigError> for EmailError {
    fn from(err: core_config::ConfigError) -> Self {
        EmailError::Config(err.to_string())
    }
}
