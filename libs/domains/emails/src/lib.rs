//! Emails Domain
//!
//! Transactional email for the care-team pipeline: Handlebars templates
//! for the three message kinds (assignment, emergency, progress), three
//! interchangeable transport providers behind one trait, and an audit
//! sink recording every send attempt.
//!
//! ```text
//! ┌────────────────┐
//! │  Orchestrator  │  ← one send per resolved recipient
//! └───────┬────────┘
//!         │
//! ┌───────▼────────┐
//! │  EmailService  │  ← render (HTML + text), transmit, audit
//! └───────┬────────┘
//!         │
//! ┌───────▼────────┐
//! │ EmailProvider  │  ← HTTP API, local relay, or console sink
//! └────────────────┘
//! ```
//!
//! The service never retries a send and never persists a message; failure
//! handling is per-recipient aggregation in the orchestration layer, and
//! the only durable trace is the audit entry.

pub mod audit;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod service;
pub mod templates;

pub use audit::{EmailAuditSink, InMemoryAuditSink, LogAuditSink};
pub use config::{MailerConfig, MailerProviderKind};
pub use error::{EmailError, EmailResult};
pub use models::{
    AssignmentEmailData, EmailAuditEntry, EmailKind, EmailMessage, EmailMetadata, EmailPriority,
    EmergencyEmailData, ProgressEmailData, SendOutcome,
};
pub use providers::{
    ConsoleProvider, EmailProvider, HttpApiConfig, HttpApiProvider, MockProvider, RelayProvider,
};
pub use service::{EmailContext, EmailService};
pub use templates::{RenderedEmail, TemplateEngine};
