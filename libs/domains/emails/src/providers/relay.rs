//! Local backend relay provider.
//!
//! POSTs `{to, subject, html, text}` to a relay endpoint owned by the
//! hosting backend, which holds the real transport credentials. The
//! relay answers `{success, messageId}`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::EmailProvider;
use crate::error::{EmailError, EmailResult};
use crate::models::{EmailMessage, SendOutcome};

/// Email provider that forwards through a local relay endpoint.
pub struct RelayProvider {
    relay_url: String,
    client: Client,
}

impl RelayProvider {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            client: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    success: bool,
    #[serde(rename = "messageId")]
    message_id: Option<String>,
    error: Option<String>,
}

#[async_trait]
impl EmailProvider for RelayProvider {
    async fn send(&self, email: &EmailMessage) -> EmailResult<SendOutcome> {
        debug!(to = %email.to_email, subject = %email.subject, "Sending email via relay");

        let response = self
            .client
            .post(&self.relay_url)
            .json(&RelayRequest {
                to: &email.to_email,
                subject: &email.subject,
                html: &email.html_body,
                text: &email.text_body,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(to = %email.to_email, status = %status, "Relay rejected email");
            return Err(EmailError::Provider(format!(
                "Relay error ({status}): {body}"
            )));
        }

        let body: RelayResponse = response.json().await?;
        if !body.success {
            let reason = body.error.unwrap_or_else(|| "unspecified".to_string());
            error!(to = %email.to_email, reason = %reason, "Relay reported failure");
            return Err(EmailError::Provider(format!("Relay failure: {reason}")));
        }

        info!(to = %email.to_email, message_id = ?body.message_id, "Email accepted by relay");
        Ok(SendOutcome {
            provider: self.name().to_string(),
            message_id: body.message_id,
        })
    }

    fn name(&self) -> &'static str {
        "relay"
    }

    async fn health_check(&self) -> EmailResult<bool> {
        Ok(!self.relay_url.is_empty())
    }
}
