//! After-the-fact audit of email send attempts.
//!
//! Emails themselves are stateless and never persisted; what survives is
//! one [`EmailAuditEntry`] per attempt, success or failure.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::models::EmailAuditEntry;

/// Sink for email audit entries.
#[async_trait]
pub trait EmailAuditSink: Send + Sync {
    async fn record(&self, entry: EmailAuditEntry);
}

/// Audit sink that only logs. The default outside tests.
#[derive(Debug, Default)]
pub struct LogAuditSink;

#[async_trait]
impl EmailAuditSink for LogAuditSink {
    async fn record(&self, entry: EmailAuditEntry) {
        info!(
            patient_id = %entry.patient_id,
            staff_id = %entry.staff_id,
            role = %entry.role,
            kind = %entry.kind,
            success = entry.success,
            provider = %entry.provider,
            message_id = ?entry.message_id,
            error = ?entry.error,
            "Email audit"
        );
    }
}

/// In-memory audit sink, for tests and local development.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAuditSink {
    entries: Arc<RwLock<Vec<EmailAuditEntry>>>,
}

impl InMemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<EmailAuditEntry> {
        self.entries.read().unwrap().clone()
    }
}

#[async_trait]
impl EmailAuditSink for InMemoryAuditSink {
    async fn record(&self, entry: EmailAuditEntry) {
        self.entries.write().unwrap().push(entry);
    }
}
