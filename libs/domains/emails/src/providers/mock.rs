//! Mock email provider for tests. Always compiled so downstream crates
//! can capture sends in their own suites.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::EmailProvider;
use crate::error::{EmailError, EmailResult};
use crate::models::{EmailMessage, SendOutcome};

/// Mock email provider that captures sent emails.
pub struct MockProvider {
    sent_emails: Arc<Mutex<Vec<EmailMessage>>>,
    fail_all: Option<String>,
    fail_for: HashSet<String>,
}

impl MockProvider {
    /// A provider that accepts everything.
    pub fn new() -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            fail_all: None,
            fail_for: HashSet::new(),
        }
    }

    /// A provider that fails every send with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_all: Some(message.into()),
            ..Self::new()
        }
    }

    /// A provider that fails only sends addressed to `email`.
    pub fn failing_for(email: impl Into<String>) -> Self {
        let mut provider = Self::new();
        provider.fail_for.insert(email.into());
        provider
    }

    /// All captured emails, in send order.
    pub async fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent_emails.lock().await.clone()
    }

    /// Count of captured emails.
    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    /// Whether an email was captured for a specific address.
    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to_email == email)
    }

    /// Drop all captured emails.
    pub async fn clear(&self) {
        self.sent_emails.lock().await.clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MockProvider {
    async fn send(&self, email: &EmailMessage) -> EmailResult<SendOutcome> {
        if let Some(message) = &self.fail_all {
            return Err(EmailError::Provider(message.clone()));
        }
        if self.fail_for.contains(&email.to_email) {
            return Err(EmailError::Provider(format!(
                "Mock failure for {}",
                email.to_email
            )));
        }

        self.sent_emails.lock().await.push(email.clone());
        Ok(SendOutcome {
            provider: self.name().to_string(),
            message_id: Some(format!("mock-{}", self.sent_emails.lock().await.len())),
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn health_check(&self) -> EmailResult<bool> {
        Ok(self.fail_all.is_none())
    }
}
