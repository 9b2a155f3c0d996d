//! Email transport providers.
//!
//! Three interchangeable transports satisfy the same [`EmailProvider`]
//! contract: an HTTP email API, a local backend relay, and a log-only
//! console fallback. [`MockProvider`] is always compiled so downstream
//! crates can capture sends in their own tests.
//!
//! Providers do not retry; per-recipient failure isolation is the
//! orchestration layer's job.

mod console;
mod http_api;
mod mock;
mod relay;

pub use console::ConsoleProvider;
pub use http_api::{HttpApiConfig, HttpApiProvider};
pub use mock::MockProvider;
pub use relay::RelayProvider;

use async_trait::async_trait;

use crate::error::EmailResult;
use crate::models::{EmailMessage, SendOutcome};

/// Trait for email sending transports.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send an email. Returns the provider acceptance, or an error for
    /// the caller to aggregate; no internal retry.
    async fn send(&self, email: &EmailMessage) -> EmailResult<SendOutcome>;

    /// Provider name for logging and audit records.
    fn name(&self) -> &'static str;

    /// Check if the provider is healthy/configured.
    async fn health_check(&self) -> EmailResult<bool>;
}
