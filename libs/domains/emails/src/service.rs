//! Email service: render a message kind, transmit it through the
//! configured provider, and record an audit entry either way.

use std::sync::Arc;

use chrono::Utc;
use domain_directory::{Contact, StaffRole};
use tracing::warn;

use crate::audit::EmailAuditSink;
use crate::error::EmailResult;
use crate::models::{
    AssignmentEmailData, EmailAuditEntry, EmailKind, EmailMessage, EmailMetadata, EmailPriority,
    EmergencyEmailData, ProgressEmailData, SendOutcome,
};
use crate::providers::EmailProvider;
use crate::templates::{RenderedEmail, TemplateEngine};

/// Fields shared by every send: who the message is about and who gets it.
#[derive(Debug, Clone)]
pub struct EmailContext {
    pub patient_id: String,
    pub patient_name: String,
}

/// Service for sending the three transactional email kinds.
///
/// Sends are not retried here; per-recipient failure isolation belongs to
/// the orchestration layer.
pub struct EmailService {
    provider: Arc<dyn EmailProvider>,
    templates: TemplateEngine,
    audit: Arc<dyn EmailAuditSink>,
}

impl EmailService {
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        audit: Arc<dyn EmailAuditSink>,
    ) -> EmailResult<Self> {
        Ok(Self {
            provider,
            templates: TemplateEngine::new()?,
            audit,
        })
    }

    /// Send an assignment notification to one staff contact.
    pub async fn send_assignment(
        &self,
        context: &EmailContext,
        to: &Contact,
        role: StaffRole,
        assignment_type: &str,
    ) -> EmailResult<SendOutcome> {
        let rendered = self.templates.render_assignment(&AssignmentEmailData {
            staff_name: to.name.clone(),
            role: role.to_string(),
            patient_name: context.patient_name.clone(),
            patient_id: context.patient_id.clone(),
            assignment_type: assignment_type.to_string(),
        })?;
        self.transmit(context, to, role, EmailKind::Assignment, EmailPriority::Normal, rendered)
            .await
    }

    /// Send an emergency alert to one staff contact.
    pub async fn send_emergency(
        &self,
        context: &EmailContext,
        to: &Contact,
        role: StaffRole,
        severity: &str,
        description: &str,
        location: &str,
    ) -> EmailResult<SendOutcome> {
        let rendered = self.templates.render_emergency(&EmergencyEmailData {
            staff_name: to.name.clone(),
            patient_name: context.patient_name.clone(),
            patient_id: context.patient_id.clone(),
            severity: severity.to_string(),
            description: description.to_string(),
            location: location.to_string(),
        })?;
        self.transmit(context, to, role, EmailKind::Emergency, EmailPriority::High, rendered)
            .await
    }

    /// Send a progress update to one staff contact.
    pub async fn send_progress(
        &self,
        context: &EmailContext,
        to: &Contact,
        role: StaffRole,
        progress_summary: &str,
    ) -> EmailResult<SendOutcome> {
        let rendered = self.templates.render_progress(&ProgressEmailData {
            staff_name: to.name.clone(),
            patient_name: context.patient_name.clone(),
            patient_id: context.patient_id.clone(),
            progress_summary: progress_summary.to_string(),
        })?;
        self.transmit(context, to, role, EmailKind::Progress, EmailPriority::Normal, rendered)
            .await
    }

    async fn transmit(
        &self,
        context: &EmailContext,
        to: &Contact,
        role: StaffRole,
        kind: EmailKind,
        priority: EmailPriority,
        rendered: RenderedEmail,
    ) -> EmailResult<SendOutcome> {
        let message = EmailMessage {
            to_email: to.email.clone(),
            to_name: to.name.clone(),
            subject: rendered.subject,
            html_body: rendered.html,
            text_body: rendered.text,
            priority,
            metadata: EmailMetadata {
                kind,
                recipient_id: to.id.clone(),
                recipient_role: role,
                patient_id: context.patient_id.clone(),
                timestamp: Utc::now(),
            },
        };

        let result = self.provider.send(&message).await;

        let entry = match &result {
            Ok(outcome) => EmailAuditEntry {
                patient_id: context.patient_id.clone(),
                staff_id: to.id.clone(),
                role,
                kind,
                success: true,
                provider: outcome.provider.clone(),
                message_id: outcome.message_id.clone(),
                error: None,
                at: Utc::now(),
            },
            Err(err) => {
                warn!(
                    to = %to.email,
                    kind = %kind,
                    error = %err,
                    "Email send failed"
                );
                EmailAuditEntry {
                    patient_id: context.patient_id.clone(),
                    staff_id: to.id.clone(),
                    role,
                    kind,
                    success: false,
                    provider: self.provider.name().to_string(),
                    message_id: None,
                    error: Some(err.to_string()),
                    at: Utc::now(),
                }
            }
        };
        self.audit.record(entry).await;

        result
    }
}
