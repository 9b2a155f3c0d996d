//! Staff resolution: assignment slot value -> contactable identity.
//!
//! Assignment values come from several entry points and are not guaranteed
//! to be record keys; a value like `"Nurse Jane Doe"` must still resolve.
//! The resolver layers four strategies, stopping at the first hit:
//!
//! 1. key lookup in the role-specific record set;
//! 2. key lookup in the generic user directory, accepted only when the
//!    record's role matches (buddy aliases normalized);
//! 3. name scan of the role's directory users with a symmetric
//!    case-insensitive substring match;
//! 4. a second, independent run of the same scan, ignoring whatever
//!    partial failure the first one hit.
//!
//! A store error inside a step is logged and resolution falls through to
//! the next step; a slot that resolves nowhere is reported as skipped and
//! never aborts resolution of the other slots.

use std::sync::Arc;

use backoff::{RetryPolicy, retry};
use tracing::{debug, warn};

use crate::models::{Contact, Recipient, ResolvedCareTeam, StaffAssignments, StaffRecord, StaffRole};
use crate::store::DirectoryStore;

/// Resolves staff identifiers (keys or display names) to contacts.
pub struct StaffResolver {
    store: Arc<dyn DirectoryStore>,
    policy: RetryPolicy,
}

impl StaffResolver {
    pub fn new(store: Arc<dyn DirectoryStore>, policy: RetryPolicy) -> Self {
        Self { store, policy }
    }

    /// Resolve one identifier for one role slot. Returns `None` when no
    /// strategy produces a contactable record; never errors.
    pub async fn resolve(&self, identifier: &str, role: StaffRole) -> Option<Contact> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return None;
        }

        // Step 1: key in the role-specific record set.
        match retry(&self.policy, || self.store.staff_by_id(role, identifier)).await {
            Ok(Some(record)) => {
                if let Some(contact) = contact_from(&record) {
                    debug!(%role, identifier, contact_id = %contact.id, "Resolved via role record set");
                    return Some(contact);
                }
                warn!(%role, identifier, "Role record has no email address, trying directory");
            }
            Ok(None) => {}
            Err(err) => {
                warn!(%role, identifier, error = %err, "Role record lookup failed, falling through");
            }
        }

        // Step 2: key in the generic user directory, role must match.
        match retry(&self.policy, || self.store.user_by_id(identifier)).await {
            Ok(Some(record)) if record.role == Some(role) => {
                if let Some(contact) = contact_from(&record) {
                    debug!(%role, identifier, contact_id = %contact.id, "Resolved via user directory key");
                    return Some(contact);
                }
            }
            Ok(_) => {}
            Err(err) => {
                warn!(%role, identifier, error = %err, "User directory lookup failed, falling through");
            }
        }

        // Steps 3 and 4: treat the identifier as a display name and scan
        // the role's directory users. The second pass is a deliberate
        // independent retry of the same predicate.
        for pass in 1..=2u8 {
            match retry(&self.policy, || self.store.users_by_role(role)).await {
                Ok(users) => {
                    let matched = users.iter().find(|record| {
                        record
                            .full_name()
                            .is_some_and(|name| names_overlap(&name, identifier))
                    });
                    if let Some(contact) = matched.and_then(contact_from) {
                        debug!(%role, identifier, contact_id = %contact.id, pass, "Resolved via name fallback");
                        return Some(contact);
                    }
                }
                Err(err) => {
                    warn!(%role, identifier, pass, error = %err, "Directory scan failed");
                }
            }
        }

        warn!(%role, identifier, "Staff identifier did not resolve to a contact");
        None
    }

    /// Resolve every assigned slot of a patient. Empty and unresolvable
    /// slots end up in `skipped`; one slot never aborts the others.
    pub async fn resolve_assignments(&self, assignments: &StaffAssignments) -> ResolvedCareTeam {
        let mut team = ResolvedCareTeam::default();
        for role in StaffRole::ALL {
            let Some(identifier) = assignments.slot(role) else {
                team.skipped.push(role);
                continue;
            };
            match self.resolve(identifier, role).await {
                Some(contact) => team.recipients.push(Recipient { role, contact }),
                None => team.skipped.push(role),
            }
        }
        team
    }
}

/// A record becomes a contact only if it has an email address.
fn contact_from(record: &StaffRecord) -> Option<Contact> {
    let email = record.email.as_deref()?.trim();
    if email.is_empty() {
        return None;
    }
    Some(Contact {
        id: record.id.clone(),
        name: record.full_name().unwrap_or_else(|| record.id.clone()),
        email: email.to_string(),
    })
}

/// Symmetric case-insensitive substring match between a composed full name
/// and the raw identifier.
fn names_overlap(full_name: &str, identifier: &str) -> bool {
    let name = full_name.trim().to_lowercase();
    let ident = identifier.trim().to_lowercase();
    if name.is_empty() || ident.is_empty() {
        return false;
    }
    name.contains(&ident) || ident.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;
    use crate::store::{InMemoryDirectory, MockDirectoryStore};

    fn record(id: &str, name: &str, email: Option<&str>, role: StaffRole) -> StaffRecord {
        StaffRecord {
            id: id.to_string(),
            display_name: Some(name.to_string()),
            email: email.map(str::to_string),
            role: Some(role),
            ..Default::default()
        }
    }

    fn resolver(store: impl DirectoryStore + 'static) -> StaffResolver {
        StaffResolver::new(Arc::new(store), RetryPolicy::no_retry())
    }

    #[test]
    fn names_overlap_is_symmetric_and_case_insensitive() {
        assert!(names_overlap("Jane Doe", "nurse jane doe"));
        assert!(names_overlap("Nurse Jane Doe", "jane doe"));
        assert!(names_overlap("JANE DOE", "Jane Doe"));
        assert!(!names_overlap("Jane Doe", "John Smith"));
        assert!(!names_overlap("", "Jane"));
    }

    #[tokio::test]
    async fn direct_role_key_short_circuits_the_directory() {
        let mut store = MockDirectoryStore::new();
        store
            .expect_staff_by_id()
            .times(1)
            .returning(|_, _| Ok(Some(record("D1", "Greg House", Some("house@example.com"), StaffRole::Doctor))));
        // The generic directory must not be consulted.
        store.expect_user_by_id().times(0);
        store.expect_users_by_role().times(0);

        let contact = resolver(store).resolve("D1", StaffRole::Doctor).await.unwrap();
        assert_eq!(contact.id, "D1");
        assert_eq!(contact.email, "house@example.com");
    }

    #[tokio::test]
    async fn directory_key_requires_matching_role() {
        let directory = InMemoryDirectory::new()
            .with_user(record("U1", "Jane Doe", Some("jane@example.com"), StaffRole::Nurse));

        // Right key, wrong role: the key lookup is rejected, and the name
        // scan does not match "U1" either.
        assert!(resolver(directory.clone()).resolve("U1", StaffRole::Doctor).await.is_none());
        assert!(resolver(directory).resolve("U1", StaffRole::Nurse).await.is_some());
    }

    #[tokio::test]
    async fn name_fallback_matches_case_insensitive_substring() {
        let directory = InMemoryDirectory::new()
            .with_user(record("U7", "Jane Doe", Some("jane@example.com"), StaffRole::Nurse));

        let contact = resolver(directory)
            .resolve("Nurse Jane Doe", StaffRole::Nurse)
            .await
            .unwrap();
        assert_eq!(contact.id, "U7");
        assert_eq!(contact.name, "Jane Doe");
    }

    #[tokio::test]
    async fn unresolvable_identifier_returns_none_without_error() {
        let directory = InMemoryDirectory::new();
        assert!(resolver(directory).resolve("nobody", StaffRole::Buddy).await.is_none());
    }

    #[tokio::test]
    async fn second_scan_pass_recovers_from_a_failed_first_scan() {
        let mut store = MockDirectoryStore::new();
        store.expect_staff_by_id().returning(|_, _| Ok(None));
        store.expect_user_by_id().returning(|_| Ok(None));

        let mut scans = 0u32;
        store.expect_users_by_role().times(2).returning(move |_| {
            scans += 1;
            if scans == 1 {
                Err(DirectoryError::Store("transient scan failure".into()))
            } else {
                Ok(vec![record("U2", "Jane Doe", Some("jane@example.com"), StaffRole::Nurse)])
            }
        });

        let contact = resolver(store).resolve("Jane Doe", StaffRole::Nurse).await;
        assert_eq!(contact.unwrap().id, "U2");
    }

    #[tokio::test]
    async fn records_without_email_are_skipped() {
        let directory = InMemoryDirectory::new()
            .with_staff(StaffRole::Doctor, record("D1", "Greg House", None, StaffRole::Doctor))
            .with_user(record("U1", "Greg House", Some("house@example.com"), StaffRole::Doctor));

        // The role record matches by key but has no email; the name scan
        // then finds the directory record that does.
        let contact = resolver(directory).resolve("Greg House", StaffRole::Doctor).await;
        assert_eq!(contact.unwrap().email, "house@example.com");
    }

    #[tokio::test]
    async fn first_match_in_iteration_order_wins_on_ambiguity() {
        let directory = InMemoryDirectory::new()
            .with_user(record("U1", "Jane Doe", Some("doe@example.com"), StaffRole::Nurse))
            .with_user(record("U2", "Jane Smith", Some("smith@example.com"), StaffRole::Nurse));

        let contact = resolver(directory).resolve("Jane Doe", StaffRole::Nurse).await;
        assert_eq!(contact.unwrap().id, "U1");
    }

    #[tokio::test]
    async fn resolve_assignments_collects_recipients_and_skipped_slots() {
        let directory = InMemoryDirectory::new()
            .with_staff(
                StaffRole::Doctor,
                record("D1", "Greg House", Some("house@example.com"), StaffRole::Doctor),
            )
            .with_user(record("U7", "Jane Doe", Some("jane@example.com"), StaffRole::Nurse));

        let assignments = StaffAssignments {
            doctor: Some("D1".into()),
            nurse: Some("Nurse Jane Doe".into()),
            buddy: None,
        };

        let team = resolver(directory).resolve_assignments(&assignments).await;
        assert_eq!(team.recipients.len(), 2);
        assert_eq!(team.recipients[0].role, StaffRole::Doctor);
        assert_eq!(team.recipients[1].role, StaffRole::Nurse);
        assert_eq!(team.skipped, vec![StaffRole::Buddy]);
    }
}
