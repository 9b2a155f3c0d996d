//! Shared fixtures for cross-crate tests.
//!
//! A seeded care-team directory and pre-wired notification/email stacks,
//! so integration tests assemble the pipeline in a couple of lines.

use std::sync::Arc;

use backoff::RetryPolicy;
use domain_directory::{InMemoryDirectory, Patient, StaffRecord, StaffRole};
use domain_emails::{EmailProvider, EmailService, InMemoryAuditSink};
use domain_notifications::{
    InMemoryNotificationRepository, NotificationConfig, NotificationService, RecordingToastSink,
};

/// Doctor key present in the role-specific record set.
pub const DOCTOR_ID: &str = "D1";
/// Nurse present only in the generic user directory, under this key.
pub const NURSE_ID: &str = "U7";
/// Buddy present only in the generic user directory, under this key.
pub const BUDDY_ID: &str = "U9";
/// Seeded patient key.
pub const PATIENT_ID: &str = "P1";

/// A directory seeded with the canonical care team:
///
/// - doctor `D1` ("Greg House") in the doctors record set;
/// - nurse "Jane Doe" only in the generic directory (resolvable by name);
/// - buddy "Bob Buddy" only in the generic directory;
/// - patient `P1` assigned `D1` by key and the nurse by display name,
///   with no buddy.
pub fn care_team_directory() -> InMemoryDirectory {
    InMemoryDirectory::new()
        .with_staff(
            StaffRole::Doctor,
            StaffRecord {
                id: DOCTOR_ID.to_string(),
                first_name: Some("Greg".to_string()),
                last_name: Some("House".to_string()),
                email: Some("house@example.com".to_string()),
                role: Some(StaffRole::Doctor),
                ..Default::default()
            },
        )
        .with_user(StaffRecord {
            id: NURSE_ID.to_string(),
            display_name: Some("Jane Doe".to_string()),
            email: Some("jane@example.com".to_string()),
            role: Some(StaffRole::Nurse),
            ..Default::default()
        })
        .with_user(StaffRecord {
            id: BUDDY_ID.to_string(),
            display_name: Some("Bob Buddy".to_string()),
            email: Some("bob@example.com".to_string()),
            role: Some(StaffRole::Buddy),
            ..Default::default()
        })
        .with_patient(sample_patient())
}

/// The canonical patient: doctor assigned by key, nurse by display name,
/// no buddy.
pub fn sample_patient() -> Patient {
    Patient {
        id: PATIENT_ID.to_string(),
        name: "Pat Example".to_string(),
        email: Some("pat@example.com".to_string()),
        assigned_doctor: Some(DOCTOR_ID.to_string()),
        assigned_nurse: Some("Nurse Jane Doe".to_string()),
        assigned_buddy: None,
    }
}

/// A notification service over in-memory storage with a recording toast
/// sink and no retry delays.
pub fn notification_stack() -> (
    Arc<NotificationService>,
    Arc<InMemoryNotificationRepository>,
    Arc<RecordingToastSink>,
) {
    let repository = Arc::new(InMemoryNotificationRepository::new());
    let sink = Arc::new(RecordingToastSink::new());
    let config = NotificationConfig {
        retry: RetryPolicy::no_retry(),
        ..Default::default()
    };
    let service = NotificationService::new(repository.clone(), sink.clone(), config);
    (service, repository, sink)
}

/// An email service over the given provider with an in-memory audit sink.
pub fn email_stack(provider: Arc<dyn EmailProvider>) -> (Arc<EmailService>, InMemoryAuditSink) {
    let audit = InMemoryAuditSink::new();
    let service = EmailService::new(provider, Arc::new(audit.clone()))
        .expect("built-in templates must register");
    (Arc::new(service), audit)
}
