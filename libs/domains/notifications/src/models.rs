//! Data models for the notifications domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

/// Types of in-app notifications.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    Reminder,
    Emergency,
    SessionUpdate,
    CarePlanUpdate,
    BuddyAssignment,
    ProgressUpdate,
    SystemAlert,
}

/// Notification priority, ordered low < medium < high < urgent < critical.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationPriority {
    Low,
    Medium,
    High,
    Urgent,
    Critical,
}

/// Notification delivery status.
///
/// `Read` and `Acknowledged` are best-effort summaries: once several
/// viewers interact with a notification the single status value cannot
/// reflect all of them. The `read_by`/`acknowledged_by` sets on
/// [`Notification`] are the source of truth.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Acknowledged,
    Expired,
}

/// Entity a notification refers to (a patient, a session, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub kind: String,
    pub id: String,
}

/// A persisted in-app notification.
///
/// Notifications are never deleted by the core; the persisted set doubles
/// as an audit trail. UI-level "delete" only hides entries client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub notification_type: NotificationType,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub recipient_id: String,
    /// May be the literal `"system"` for notifications with no human sender.
    pub sender_id: String,
    pub related_entity: Option<RelatedEntity>,
    pub metadata: serde_json::Value,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub requires_acknowledgment: bool,
    /// Append-only set of viewers who marked the notification read.
    pub read_by: Vec<String>,
    /// Append-only set of viewers who acknowledged the notification.
    pub acknowledged_by: Vec<String>,
}

impl Notification {
    /// Append `user_id` to `read_by` if absent. Returns whether it was added.
    pub fn mark_read_by(&mut self, user_id: &str) -> bool {
        if self.read_by.iter().any(|u| u == user_id) {
            return false;
        }
        self.read_by.push(user_id.to_string());
        true
    }

    /// Append `user_id` to `acknowledged_by` if absent. Returns whether it
    /// was added.
    pub fn acknowledge_by(&mut self, user_id: &str) -> bool {
        if self.acknowledged_by.iter().any(|u| u == user_id) {
            return false;
        }
        self.acknowledged_by.push(user_id.to_string());
        true
    }

    pub fn is_read_by(&self, user_id: &str) -> bool {
        self.read_by.iter().any(|u| u == user_id)
    }

    pub fn is_acknowledged_by(&self, user_id: &str) -> bool {
        self.acknowledged_by.iter().any(|u| u == user_id)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Specification for creating a notification.
///
/// Missing required fields are programming errors: they fail validation
/// immediately and are never retried.
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateNotification {
    #[validate(length(min = 1, message = "recipient_id must not be empty"))]
    pub recipient_id: String,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub message: String,
    /// Defaults to [`NotificationType::SystemAlert`].
    pub notification_type: Option<NotificationType>,
    /// Defaults to [`NotificationPriority::Medium`].
    pub priority: Option<NotificationPriority>,
    /// Defaults to `"system"`.
    pub sender_id: Option<String>,
    pub related_entity: Option<RelatedEntity>,
    pub metadata: Option<serde_json::Value>,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub requires_acknowledgment: bool,
}

impl CreateNotification {
    pub fn new(
        recipient_id: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            title: title.into(),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Materialize the notification with defaults applied and a
    /// time-ordered identifier assigned.
    pub fn into_notification(self, now: DateTime<Utc>) -> Notification {
        Notification {
            id: Uuid::now_v7(),
            notification_type: self.notification_type.unwrap_or(NotificationType::SystemAlert),
            priority: self.priority.unwrap_or(NotificationPriority::Medium),
            title: self.title,
            message: self.message,
            recipient_id: self.recipient_id,
            sender_id: self.sender_id.unwrap_or_else(|| "system".to_string()),
            related_entity: self.related_entity,
            metadata: self.metadata.unwrap_or(serde_json::Value::Null),
            status: NotificationStatus::Pending,
            created_at: now,
            scheduled_for: self.scheduled_for,
            expires_at: self.expires_at,
            sent_at: None,
            requires_acknowledgment: self.requires_acknowledgment,
            read_by: Vec::new(),
            acknowledged_by: Vec::new(),
        }
    }
}

/// Query filter for a recipient's notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationFilter {
    pub notification_type: Option<NotificationType>,
    pub status: Option<NotificationStatus>,
    pub priority: Option<NotificationPriority>,
    /// Only notifications the recipient has not marked read.
    pub unread_only: bool,
}

impl NotificationFilter {
    /// Whether a notification addressed to `recipient` passes the filter.
    pub fn matches(&self, notification: &Notification, recipient: &str) -> bool {
        if notification.recipient_id != recipient {
            return false;
        }
        if let Some(t) = self.notification_type
            && notification.notification_type != t
        {
            return false;
        }
        if let Some(s) = self.status
            && notification.status != s
        {
            return false;
        }
        if let Some(p) = self.priority
            && notification.priority != p
        {
            return false;
        }
        if self.unread_only && notification.is_read_by(recipient) {
            return false;
        }
        true
    }
}

/// Aggregate counts for a recipient's notification list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    /// Acknowledgment-required notifications the recipient has not
    /// acknowledged yet.
    pub unacknowledged: usize,
    pub by_priority: HashMap<NotificationPriority, usize>,
}
