//! Event orchestration: emergency, assignment, and progress fan-out.
//!
//! Each workflow runs the same sequence: resolve recipients, then fan the
//! event out to every resolved recipient over two independent channels
//! (in-app notification, email), settle-all. One recipient's transport
//! outage or missing address never prevents attempts to the others, and
//! the report always records who did succeed. The only hard failures are
//! validation, an unknown patient, and the zero-recipient case.

use std::sync::Arc;

use backoff::{RetryPolicy, retry};
use futures::future::join_all;
use tracing::{info, warn};
use validator::Validate;

use domain_directory::{
    AuthProvider, DirectoryStore, Recipient, StaffResolver, StaffRole,
};
use domain_emails::{EmailContext, EmailService};
use domain_notifications::{
    CreateNotification, NotificationPriority, NotificationService, NotificationType, RelatedEntity,
};

use crate::error::{AlertingError, AlertingResult};
use crate::models::{AssignmentNotice, EmergencyAlert, FanoutReport};

/// Orchestrates the three event-driven workflows over the resolver, the
/// notification service, and the email channel.
pub struct AlertingService {
    resolver: StaffResolver,
    directory: Arc<dyn DirectoryStore>,
    auth: Arc<dyn AuthProvider>,
    notifications: Arc<NotificationService>,
    emails: Arc<EmailService>,
    retry: RetryPolicy,
}

impl AlertingService {
    pub fn new(
        directory: Arc<dyn DirectoryStore>,
        auth: Arc<dyn AuthProvider>,
        notifications: Arc<NotificationService>,
        emails: Arc<EmailService>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            resolver: StaffResolver::new(directory.clone(), retry),
            directory,
            auth,
            notifications,
            emails,
            retry,
        }
    }

    /// Fan an emergency out to every resolvable assigned staff member.
    ///
    /// Each recipient gets an acknowledgment-required notification and an
    /// emergency email; the triggering patient gets one medium-priority
    /// confirmation reporting how many staff were notified. Returns
    /// [`AlertingError::NoAssignedStaff`] — with no side effects — when
    /// not a single slot resolves, so the caller can direct the patient
    /// to contact staff directly.
    pub async fn create_emergency_alert(
        &self,
        alert: EmergencyAlert,
    ) -> AlertingResult<FanoutReport> {
        alert.validate()?;

        let team = self.resolver.resolve_assignments(&alert.assignments).await;
        if team.recipients.is_empty() {
            warn!(patient_id = %alert.patient_id, "Emergency with no resolvable staff");
            return Err(AlertingError::NoAssignedStaff);
        }

        let priority = alert.severity.notification_priority();
        let context = EmailContext {
            patient_id: alert.patient_id.clone(),
            patient_name: alert.patient_name.clone(),
        };

        let outcomes = join_all(team.recipients.iter().map(|recipient| {
            let alert = &alert;
            let context = &context;
            async move {
                let severity = alert.severity.to_string();
                let mut spec = CreateNotification::new(
                    recipient.contact.id.clone(),
                    format!("Emergency alert: {}", alert.patient_name),
                    format!(
                        "{} emergency for {}: {} (location: {})",
                        alert.severity, alert.patient_name, alert.description, alert.location
                    ),
                );
                spec.notification_type = Some(NotificationType::Emergency);
                spec.priority = Some(priority);
                spec.requires_acknowledgment = true;
                // The triggering patient is the sender of an emergency.
                spec.sender_id = Some(alert.patient_id.clone());
                spec.related_entity = Some(RelatedEntity {
                    kind: "patient".to_string(),
                    id: alert.patient_id.clone(),
                });
                spec.metadata = Some(serde_json::json!({
                    "severity": severity,
                    "location": alert.location,
                }));

                let email = self.emails.send_emergency(
                    context,
                    &recipient.contact,
                    recipient.role,
                    &severity,
                    &alert.description,
                    &alert.location,
                );
                let notification = self.notify(recipient, spec);
                tokio::join!(notification, email)
            }
        }))
        .await;

        let mut report = self.tally(team.skipped, outcomes);

        // Confirmation back to the patient; failure here is logged, not
        // propagated - the fan-out already happened.
        let mut confirmation = CreateNotification::new(
            alert.patient_id.clone(),
            "Emergency alert sent".to_string(),
            format!(
                "{} staff member(s) have been notified of your emergency.",
                report.total_staff
            ),
        );
        confirmation.notification_type = Some(NotificationType::Emergency);
        confirmation.priority = Some(NotificationPriority::Medium);
        if let Err(err) = self.notifications.create(confirmation).await {
            warn!(patient_id = %alert.patient_id, error = %err, "Failed to create patient confirmation");
        }

        info!(
            patient_id = %alert.patient_id,
            total_staff = report.total_staff,
            notifications_ok = report.notifications.succeeded,
            emails_ok = report.emails.succeeded,
            "Emergency fan-out complete"
        );
        report.skipped_roles.sort_by_key(|r| *r as u8);
        Ok(report)
    }

    /// Notify the newly assigned staff member for one role slot.
    pub async fn send_assignment_notifications(
        &self,
        notice: AssignmentNotice,
    ) -> AlertingResult<FanoutReport> {
        notice.validate()?;

        let role = notice.assigned_role;
        let resolved = match notice.assignments.slot(role) {
            Some(identifier) => self.resolver.resolve(identifier, role).await,
            None => None,
        };
        let Some(contact) = resolved else {
            warn!(patient_id = %notice.patient_id, %role, "Assignment event with no resolvable staff");
            return Err(AlertingError::NoAssignedStaff);
        };
        let recipient = Recipient { role, contact };

        let sender_id = self.current_sender().await;
        let context = EmailContext {
            patient_id: notice.patient_id.clone(),
            patient_name: notice.patient_name.clone(),
        };

        let mut spec = CreateNotification::new(
            recipient.contact.id.clone(),
            format!("New patient assignment: {}", notice.patient_name),
            format!(
                "You have been assigned as {} for {} ({} assignment).",
                role, notice.patient_name, notice.assignment_type
            ),
        );
        spec.notification_type = Some(notice.notification_type());
        spec.sender_id = Some(sender_id);
        spec.related_entity = Some(RelatedEntity {
            kind: "patient".to_string(),
            id: notice.patient_id.clone(),
        });

        let email = self.emails.send_assignment(
            &context,
            &recipient.contact,
            role,
            &notice.assignment_type,
        );
        let notification = self.notify(&recipient, spec);
        let outcome = tokio::join!(notification, email);

        // Roles the event never targeted are not "skipped"; that word is
        // reserved for slots that failed to resolve.
        let report = self.tally(Vec::new(), vec![outcome]);
        info!(
            patient_id = %notice.patient_id,
            %role,
            notifications_ok = report.notifications.succeeded,
            emails_ok = report.emails.succeeded,
            "Assignment fan-out complete"
        );
        Ok(report)
    }

    /// Fan a progress update out to the patient's whole care team.
    pub async fn send_progress_update(
        &self,
        patient_id: &str,
        progress_summary: &str,
    ) -> AlertingResult<FanoutReport> {
        if patient_id.trim().is_empty() {
            return Err(AlertingError::Validation(
                "patient_id must not be empty".to_string(),
            ));
        }
        if progress_summary.trim().is_empty() {
            return Err(AlertingError::Validation(
                "progress summary must not be empty".to_string(),
            ));
        }

        let patient = retry(&self.retry, || self.directory.patient_by_id(patient_id))
            .await
            .map_err(|err| {
                warn!(patient_id, error = %err, "Patient lookup failed");
                AlertingError::PatientNotFound(patient_id.to_string())
            })?
            .ok_or_else(|| AlertingError::PatientNotFound(patient_id.to_string()))?;

        let team = self.resolver.resolve_assignments(&patient.assignments()).await;
        if team.recipients.is_empty() {
            warn!(patient_id, "Progress update with no resolvable staff");
            return Err(AlertingError::NoAssignedStaff);
        }

        let sender_id = self.current_sender().await;
        let context = EmailContext {
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
        };

        let outcomes = join_all(team.recipients.iter().map(|recipient| {
            let patient = &patient;
            let context = &context;
            let sender_id = sender_id.clone();
            async move {
                let mut spec = CreateNotification::new(
                    recipient.contact.id.clone(),
                    format!("Progress update for {}", patient.name),
                    progress_summary.to_string(),
                );
                spec.notification_type = Some(NotificationType::ProgressUpdate);
                spec.sender_id = Some(sender_id);
                spec.related_entity = Some(RelatedEntity {
                    kind: "patient".to_string(),
                    id: patient.id.clone(),
                });

                let email = self.emails.send_progress(
                    context,
                    &recipient.contact,
                    recipient.role,
                    progress_summary,
                );
                let notification = self.notify(recipient, spec);
                tokio::join!(notification, email)
            }
        }))
        .await;

        let report = self.tally(team.skipped, outcomes);
        info!(
            patient_id,
            total_staff = report.total_staff,
            notifications_ok = report.notifications.succeeded,
            emails_ok = report.emails.succeeded,
            "Progress fan-out complete"
        );
        Ok(report)
    }

    /// Create one staff notification, reduced to a channel outcome.
    async fn notify(&self, recipient: &Recipient, spec: CreateNotification) -> bool {
        match self.notifications.create(spec).await {
            Ok(_) => true,
            Err(err) => {
                warn!(
                    recipient = %recipient.contact.id,
                    role = %recipient.role,
                    error = %err,
                    "Failed to create staff notification"
                );
                false
            }
        }
    }

    /// Sender id for events with no explicit sender: the signed-in
    /// identity, falling back to `"system"`.
    async fn current_sender(&self) -> String {
        match self.auth.current_identity().await {
            Ok(Some(identity)) => identity.id,
            Ok(None) => "system".to_string(),
            Err(err) => {
                warn!(error = %err, "Auth lookup failed, using system sender");
                "system".to_string()
            }
        }
    }

    fn tally<E>(
        &self,
        skipped_roles: Vec<StaffRole>,
        outcomes: Vec<(bool, Result<domain_emails::SendOutcome, E>)>,
    ) -> FanoutReport {
        let mut report = FanoutReport {
            total_staff: outcomes.len(),
            skipped_roles,
            ..Default::default()
        };
        for (notification_ok, email_result) in outcomes {
            report.notifications.count(notification_ok);
            report.emails.count(email_result.is_ok());
        }
        report
    }
}
