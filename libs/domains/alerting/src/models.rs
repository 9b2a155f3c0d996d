//! Data models for the alerting domain.

use domain_directory::{StaffAssignments, StaffRole};
use domain_notifications::{NotificationPriority, NotificationType};
use validator::Validate;

/// Severity reported with an emergency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EmergencySeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EmergencySeverity {
    /// Priority of the staff-facing emergency notification: the top two
    /// severities interrupt (critical), the rest are urgent.
    pub fn notification_priority(self) -> NotificationPriority {
        match self {
            EmergencySeverity::Critical | EmergencySeverity::High => {
                NotificationPriority::Critical
            }
            EmergencySeverity::Medium | EmergencySeverity::Low => NotificationPriority::Urgent,
        }
    }
}

/// A patient-triggered emergency.
#[derive(Debug, Clone, Validate)]
pub struct EmergencyAlert {
    #[validate(length(min = 1, message = "patient_id must not be empty"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "patient_name must not be empty"))]
    pub patient_name: String,
    pub assignments: StaffAssignments,
    pub severity: EmergencySeverity,
    #[validate(length(min = 1, message = "description must not be empty"))]
    pub description: String,
    /// Free-form location; may be empty when unknown.
    pub location: String,
}

/// A staff-assignment change for one role slot.
#[derive(Debug, Clone, Validate)]
pub struct AssignmentNotice {
    #[validate(length(min = 1, message = "patient_id must not be empty"))]
    pub patient_id: String,
    #[validate(length(min = 1, message = "patient_name must not be empty"))]
    pub patient_name: String,
    pub assignments: StaffAssignments,
    /// The newly assigned role; only this slot is resolved and notified.
    pub assigned_role: StaffRole,
    /// Assignment kind shown to the recipient ("initial", "transfer", ...).
    #[validate(length(min = 1, message = "assignment_type must not be empty"))]
    pub assignment_type: String,
}

impl AssignmentNotice {
    /// Buddy assignments get their own notification type.
    pub fn notification_type(&self) -> NotificationType {
        match self.assigned_role {
            StaffRole::Buddy => NotificationType::BuddyAssignment,
            _ => NotificationType::CarePlanUpdate,
        }
    }
}

/// Per-channel success/failure tally of one fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelOutcome {
    pub succeeded: usize,
    pub failed: usize,
}

impl ChannelOutcome {
    pub fn count(&mut self, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Outcome of one orchestrated fan-out. Always returned when at least one
/// recipient resolved, however many channel attempts failed.
#[derive(Debug, Clone, Default)]
pub struct FanoutReport {
    /// Number of resolved staff recipients the event fanned out to.
    pub total_staff: usize,
    /// In-app notification channel tally across staff recipients.
    pub notifications: ChannelOutcome,
    /// Email channel tally across staff recipients.
    pub emails: ChannelOutcome,
    /// Role slots that were empty or could not be resolved.
    pub skipped_roles: Vec<StaffRole>,
}
