//! Console fallback provider: logs the message and reports success.
//! The default when no real transport is configured.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::EmailProvider;
use crate::error::EmailResult;
use crate::models::{EmailMessage, SendOutcome};

/// Log-only email provider. Always succeeds.
#[derive(Debug, Default)]
pub struct ConsoleProvider;

impl ConsoleProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailProvider for ConsoleProvider {
    async fn send(&self, email: &EmailMessage) -> EmailResult<SendOutcome> {
        info!(
            to = %email.to_email,
            subject = %email.subject,
            kind = %email.metadata.kind,
            priority = %email.priority,
            "Email (console sink, not transmitted)"
        );
        Ok(SendOutcome {
            provider: self.name().to_string(),
            message_id: Some(format!("console-{}", Uuid::new_v4())),
        })
    }

    fn name(&self) -> &'static str {
        "console"
    }

    async fn health_check(&self) -> EmailResult<bool> {
        Ok(true)
    }
}
