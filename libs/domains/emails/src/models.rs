//! Data models for the email domain.

use chrono::{DateTime, Utc};
use domain_directory::StaffRole;
use serde::{Deserialize, Serialize};

/// Email priority tag carried in message metadata.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailPriority {
    High,
    Normal,
    Low,
}

/// The three transactional message kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmailKind {
    Assignment,
    Emergency,
    Progress,
}

/// Delivery metadata attached to a message. Not rendered into the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMetadata {
    pub kind: EmailKind,
    pub recipient_id: String,
    pub recipient_role: StaffRole,
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
}

/// A fully rendered email ready for a transport provider. Stateless and
/// never persisted; only the audit entry survives the send.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to_email: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
    pub priority: EmailPriority,
    pub metadata: EmailMetadata,
}

/// Provider acceptance of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Provider name, for the audit record.
    pub provider: String,
    /// Provider-specific message id, when one is returned.
    pub message_id: Option<String>,
}

/// After-the-fact audit record of a send attempt, success or failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAuditEntry {
    pub patient_id: String,
    pub staff_id: String,
    pub role: StaffRole,
    pub kind: EmailKind,
    pub success: bool,
    pub provider: String,
    pub message_id: Option<String>,
    pub error: Option<String>,
    pub at: DateTime<Utc>,
}

/// Input for the assignment email templates.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentEmailData {
    pub staff_name: String,
    pub role: String,
    pub patient_name: String,
    pub patient_id: String,
    pub assignment_type: String,
}

/// Input for the emergency email templates.
#[derive(Debug, Clone, Serialize)]
pub struct EmergencyEmailData {
    pub staff_name: String,
    pub patient_name: String,
    pub patient_id: String,
    pub severity: String,
    pub description: String,
    pub location: String,
}

/// Input for the progress update email templates.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressEmailData {
    pub staff_name: String,
    pub patient_name: String,
    pub patient_id: String,
    pub progress_summary: String,
}
