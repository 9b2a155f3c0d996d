//! HTTP email API provider.
//!
//! Speaks a SendGrid-style JSON mail API: bearer-key auth, a
//! personalizations envelope, message id returned in the `x-message-id`
//! response header, structured error bodies.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::EmailProvider;
use crate::error::{EmailError, EmailResult};
use crate::models::{EmailMessage, SendOutcome};

/// Configuration for the HTTP API transport.
#[derive(Debug, Clone)]
pub struct HttpApiConfig {
    /// API bearer key.
    pub api_key: String,
    /// API base URL.
    pub api_url: String,
    /// Sender email address.
    pub from_email: String,
    /// Sender display name.
    pub from_name: String,
}

/// Email provider backed by an external HTTP mail API.
pub struct HttpApiProvider {
    config: HttpApiConfig,
    client: Client,
}

impl HttpApiProvider {
    pub fn new(config: HttpApiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    personalizations: Vec<Personalization>,
    from: Address,
    subject: String,
    content: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Personalization {
    to: Vec<Address>,
}

#[derive(Debug, Serialize)]
struct Address {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl EmailProvider for HttpApiProvider {
    async fn send(&self, email: &EmailMessage) -> EmailResult<SendOutcome> {
        let request = ApiRequest {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: email.to_email.clone(),
                    name: if email.to_name.is_empty() {
                        None
                    } else {
                        Some(email.to_name.clone())
                    },
                }],
            }],
            from: Address {
                email: self.config.from_email.clone(),
                name: Some(self.config.from_name.clone()),
            },
            subject: email.subject.clone(),
            content: vec![
                Content {
                    content_type: "text/plain".to_string(),
                    value: email.text_body.clone(),
                },
                Content {
                    content_type: "text/html".to_string(),
                    value: email.html_body.clone(),
                },
            ],
        };

        debug!(to = %email.to_email, subject = %email.subject, "Sending email via HTTP API");

        let response = self
            .client
            .post(format!("{}/mail/send", self.config.api_url))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let message_id = response
            .headers()
            .get("x-message-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if status.is_success() {
            info!(to = %email.to_email, message_id = ?message_id, "Email accepted by HTTP API");
            return Ok(SendOutcome {
                provider: self.name().to_string(),
                message_id,
            });
        }

        let error_body = response.text().await.unwrap_or_default();
        error!(to = %email.to_email, status = %status, error = %error_body, "HTTP API rejected email");

        let message = match serde_json::from_str::<ApiErrorBody>(&error_body) {
            Ok(body) => body
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", "),
            Err(_) => error_body,
        };
        Err(EmailError::Provider(format!(
            "HTTP API error ({status}): {message}"
        )))
    }

    fn name(&self) -> &'static str {
        "http_api"
    }

    async fn health_check(&self) -> EmailResult<bool> {
        Ok(!self.config.api_key.is_empty() && !self.config.from_email.is_empty())
    }
}
