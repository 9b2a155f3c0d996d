//! Mailer configuration and provider selection.

use std::sync::Arc;

use core_config::{ConfigError, FromEnv, env_or_default, env_required};

use crate::error::{EmailError, EmailResult};
use crate::providers::{
    ConsoleProvider, EmailProvider, HttpApiConfig, HttpApiProvider, RelayProvider,
};

/// Which transport the mailer uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailerProviderKind {
    /// External HTTP email API.
    Api,
    /// Local backend relay endpoint.
    Relay,
    /// Log-only console sink. The default.
    Console,
}

impl std::str::FromStr for MailerProviderKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "api" => Ok(MailerProviderKind::Api),
            "relay" => Ok(MailerProviderKind::Relay),
            "console" => Ok(MailerProviderKind::Console),
            other => Err(format!("unknown mailer provider '{other}'")),
        }
    }
}

/// Mailer settings. Loaded from the environment at the composition root
/// and injected; services never read env themselves.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    pub provider: MailerProviderKind,
    pub api_key: Option<String>,
    pub api_url: String,
    pub from_email: String,
    pub from_name: String,
    pub relay_url: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            provider: MailerProviderKind::Console,
            api_key: None,
            api_url: "https://api.sendgrid.com/v3".to_string(),
            from_email: "noreply@carelink.example".to_string(),
            from_name: "CareLink".to_string(),
            relay_url: "http://localhost:8080/api/send-email".to_string(),
        }
    }
}

impl FromEnv for MailerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let provider = env_or_default("MAILER_PROVIDER", "console")
            .parse()
            .map_err(|details| ConfigError::ParseError {
                key: "MAILER_PROVIDER".to_string(),
                details,
            })?;

        // The API key is only required when the API transport is selected.
        let api_key = match provider {
            MailerProviderKind::Api => Some(env_required("MAIL_API_KEY")?),
            _ => std::env::var("MAIL_API_KEY").ok(),
        };

        Ok(Self {
            provider,
            api_key,
            api_url: env_or_default("MAIL_API_URL", &defaults.api_url),
            from_email: env_or_default("MAIL_FROM_EMAIL", &defaults.from_email),
            from_name: env_or_default("MAIL_FROM_NAME", &defaults.from_name),
            relay_url: env_or_default("MAIL_RELAY_URL", &defaults.relay_url),
        })
    }
}

impl MailerConfig {
    /// Construct the configured transport.
    pub fn build_provider(&self) -> EmailResult<Arc<dyn EmailProvider>> {
        match self.provider {
            MailerProviderKind::Api => {
                let api_key = self
                    .api_key
                    .clone()
                    .ok_or_else(|| EmailError::Config("MAIL_API_KEY not set".to_string()))?;
                Ok(Arc::new(HttpApiProvider::new(HttpApiConfig {
                    api_key,
                    api_url: self.api_url.clone(),
                    from_email: self.from_email.clone(),
                    from_name: self.from_name.clone(),
                })))
            }
            MailerProviderKind::Relay => Ok(Arc::new(RelayProvider::new(self.relay_url.clone()))),
            MailerProviderKind::Console => Ok(Arc::new(ConsoleProvider::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_console_provider() {
        temp_env::with_vars_unset(["MAILER_PROVIDER", "MAIL_API_KEY"], || {
            let config = MailerConfig::from_env().unwrap();
            assert_eq!(config.provider, MailerProviderKind::Console);
            let provider = config.build_provider().unwrap();
            assert_eq!(provider.name(), "console");
        });
    }

    #[test]
    fn api_provider_requires_key() {
        temp_env::with_vars(
            [("MAILER_PROVIDER", Some("api")), ("MAIL_API_KEY", None)],
            || {
                assert!(MailerConfig::from_env().is_err());
            },
        );

        temp_env::with_vars(
            [
                ("MAILER_PROVIDER", Some("api")),
                ("MAIL_API_KEY", Some("sk-test")),
                ("MAIL_FROM_EMAIL", Some("care@example.com")),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(config.provider, MailerProviderKind::Api);
                assert_eq!(config.from_email, "care@example.com");
                assert_eq!(config.build_provider().unwrap().name(), "http_api");
            },
        );
    }

    #[test]
    fn relay_provider_from_env() {
        temp_env::with_vars(
            [
                ("MAILER_PROVIDER", Some("relay")),
                ("MAIL_RELAY_URL", Some("http://localhost:9999/send")),
            ],
            || {
                let config = MailerConfig::from_env().unwrap();
                assert_eq!(config.relay_url, "http://localhost:9999/send");
                assert_eq!(config.build_provider().unwrap().name(), "relay");
            },
        );
    }

    #[test]
    fn unknown_provider_is_a_parse_error() {
        temp_env::with_var("MAILER_PROVIDER", Some("carrier-pigeon"), || {
            assert!(MailerConfig::from_env().is_err());
        });
    }
}
