//! Document-store seam for patient and staff records.
//!
//! The production deployment keeps these collections in a cloud document
//! database; the core only sees this trait. `InMemoryDirectory` backs the
//! test suites and local development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::DirectoryResult;
use crate::models::{Patient, StaffRecord, StaffRole};

/// Read access to the patient/staff collections.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Look up a staff record by key in the role-specific record set
    /// (doctors, nurses, medical buddies).
    async fn staff_by_id(&self, role: StaffRole, id: &str)
    -> DirectoryResult<Option<StaffRecord>>;

    /// Look up a record by key in the generic user directory.
    async fn user_by_id(&self, id: &str) -> DirectoryResult<Option<StaffRecord>>;

    /// List generic-directory users tagged with the given role.
    async fn users_by_role(&self, role: StaffRole) -> DirectoryResult<Vec<StaffRecord>>;

    /// Look up a patient record by key.
    async fn patient_by_id(&self, id: &str) -> DirectoryResult<Option<Patient>>;
}

/// In-memory implementation of [`DirectoryStore`] (for development/testing).
///
/// The generic user directory is kept as a `Vec` so scans iterate in
/// insertion order, which makes the resolver's name-fallback deterministic
/// in tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    staff: Arc<RwLock<HashMap<(StaffRole, String), StaffRecord>>>,
    users: Arc<RwLock<Vec<StaffRecord>>>,
    patients: Arc<RwLock<HashMap<String, Patient>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record into the role-specific record set.
    pub fn with_staff(self, role: StaffRole, record: StaffRecord) -> Self {
        {
            let mut staff = self.staff.write().unwrap();
            staff.insert((role, record.id.clone()), record);
        }
        self
    }

    /// Seed a record into the generic user directory.
    pub fn with_user(self, record: StaffRecord) -> Self {
        {
            let mut users = self.users.write().unwrap();
            users.push(record);
        }
        self
    }

    /// Seed a patient record.
    pub fn with_patient(self, patient: Patient) -> Self {
        {
            let mut patients = self.patients.write().unwrap();
            patients.insert(patient.id.clone(), patient);
        }
        self
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectory {
    async fn staff_by_id(
        &self,
        role: StaffRole,
        id: &str,
    ) -> DirectoryResult<Option<StaffRecord>> {
        let staff = self.staff.read().unwrap();
        Ok(staff.get(&(role, id.to_string())).cloned())
    }

    async fn user_by_id(&self, id: &str) -> DirectoryResult<Option<StaffRecord>> {
        let users = self.users.read().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn users_by_role(&self, role: StaffRole) -> DirectoryResult<Vec<StaffRecord>> {
        let users = self.users.read().unwrap();
        Ok(users
            .iter()
            .filter(|u| u.role == Some(role))
            .cloned()
            .collect())
    }

    async fn patient_by_id(&self, id: &str) -> DirectoryResult<Option<Patient>> {
        let patients = self.patients.read().unwrap();
        Ok(patients.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(id: &str, name: &str, email: &str, role: StaffRole) -> StaffRecord {
        StaffRecord {
            id: id.to_string(),
            display_name: Some(name.to_string()),
            email: Some(email.to_string()),
            role: Some(role),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn staff_lookup_is_scoped_by_role() {
        let directory = InMemoryDirectory::new().with_staff(
            StaffRole::Doctor,
            staff("D1", "Greg House", "house@example.com", StaffRole::Doctor),
        );

        let hit = directory.staff_by_id(StaffRole::Doctor, "D1").await.unwrap();
        assert!(hit.is_some());

        let miss = directory.staff_by_id(StaffRole::Nurse, "D1").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn users_by_role_preserves_insertion_order() {
        let directory = InMemoryDirectory::new()
            .with_user(staff("U1", "Jane Doe", "jane@example.com", StaffRole::Nurse))
            .with_user(staff("U2", "Jane Smith", "smith@example.com", StaffRole::Nurse))
            .with_user(staff("U3", "Bob Buddy", "bob@example.com", StaffRole::Buddy));

        let nurses = directory.users_by_role(StaffRole::Nurse).await.unwrap();
        let ids: Vec<&str> = nurses.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["U1", "U2"]);
    }
}
