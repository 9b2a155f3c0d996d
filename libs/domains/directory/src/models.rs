//! Data models for the directory domain.

use serde::{Deserialize, Serialize};

/// Staff role assigned to a patient slot.
///
/// The source documents spell the buddy role several ways (`buddy`,
/// `medicalBuddy`, `medical_buddy`); normalization happens here, once,
/// instead of scattered string comparisons at the call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StaffRole {
    #[serde(rename = "doctor")]
    Doctor,
    #[serde(rename = "nurse")]
    Nurse,
    #[serde(rename = "medicalBuddy", alias = "buddy", alias = "medical_buddy")]
    Buddy,
}

impl StaffRole {
    pub const ALL: [StaffRole; 3] = [StaffRole::Doctor, StaffRole::Nurse, StaffRole::Buddy];

    /// Parse a role tag, accepting the buddy aliases, case-insensitively.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "doctor" => Some(StaffRole::Doctor),
            "nurse" => Some(StaffRole::Nurse),
            "buddy" | "medicalbuddy" | "medical_buddy" => Some(StaffRole::Buddy),
            _ => None,
        }
    }
}

impl std::fmt::Display for StaffRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaffRole::Doctor => write!(f, "doctor"),
            StaffRole::Nurse => write!(f, "nurse"),
            StaffRole::Buddy => write!(f, "medicalBuddy"),
        }
    }
}

/// A staff identity, as stored either in a role-specific record set or in
/// the generic user directory. The name fields are inconsistent by source:
/// some records carry `first_name`/`last_name`, some only `display_name`,
/// some only a legacy `name`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<StaffRole>,
}

impl StaffRecord {
    /// Compose the best available full name: first+last, then display
    /// name, then the legacy `name` field.
    pub fn full_name(&self) -> Option<String> {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first.trim(), last.trim())),
            (Some(first), None) => Some(first.trim().to_string()),
            (None, Some(last)) => Some(last.trim().to_string()),
            (None, None) => self
                .display_name
                .as_deref()
                .or(self.name.as_deref())
                .map(|n| n.trim().to_string()),
        }
        .filter(|n| !n.is_empty())
    }
}

/// The three staff-assignment slots of a patient record. Each value is
/// either a staff record key or, inconsistently by source data, a display
/// name typed in elsewhere.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignments {
    #[serde(default)]
    pub doctor: Option<String>,
    #[serde(default)]
    pub nurse: Option<String>,
    #[serde(default)]
    pub buddy: Option<String>,
}

impl StaffAssignments {
    pub fn slot(&self, role: StaffRole) -> Option<&str> {
        let value = match role {
            StaffRole::Doctor => self.doctor.as_deref(),
            StaffRole::Nurse => self.nurse.as_deref(),
            StaffRole::Buddy => self.buddy.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }
}

/// A patient record. Serialized camelCase to match the source documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub assigned_doctor: Option<String>,
    #[serde(default)]
    pub assigned_nurse: Option<String>,
    #[serde(default)]
    pub assigned_buddy: Option<String>,
}

impl Patient {
    pub fn assignments(&self) -> StaffAssignments {
        StaffAssignments {
            doctor: self.assigned_doctor.clone(),
            nurse: self.assigned_nurse.clone(),
            buddy: self.assigned_buddy.clone(),
        }
    }
}

/// A resolved, contactable identity. Only records with an email address
/// can become contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A resolved recipient: which role slot it fills and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub role: StaffRole,
    pub contact: Contact,
}

/// Outcome of resolving all of a patient's assignment slots. Slots that
/// were empty or could not be mapped to a contact end up in `skipped`.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCareTeam {
    pub recipients: Vec<Recipient>,
    pub skipped: Vec<StaffRole>,
}

/// The signed-in identity exposed by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

/// Profile fields a user may update through the auth provider.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_normalizes_buddy_aliases() {
        assert_eq!(StaffRole::parse("buddy"), Some(StaffRole::Buddy));
        assert_eq!(StaffRole::parse("medicalBuddy"), Some(StaffRole::Buddy));
        assert_eq!(StaffRole::parse("medical_buddy"), Some(StaffRole::Buddy));
        assert_eq!(StaffRole::parse("MEDICALBUDDY"), Some(StaffRole::Buddy));
        assert_eq!(StaffRole::parse("doctor"), Some(StaffRole::Doctor));
        assert_eq!(StaffRole::parse("janitor"), None);
    }

    #[test]
    fn role_deserializes_both_buddy_spellings() {
        let role: StaffRole = serde_json::from_str("\"buddy\"").unwrap();
        assert_eq!(role, StaffRole::Buddy);
        let role: StaffRole = serde_json::from_str("\"medicalBuddy\"").unwrap();
        assert_eq!(role, StaffRole::Buddy);
    }

    #[test]
    fn full_name_prefers_first_and_last() {
        let record = StaffRecord {
            first_name: Some("Jane".into()),
            last_name: Some("Doe".into()),
            display_name: Some("Dr. J".into()),
            ..Default::default()
        };
        assert_eq!(record.full_name().as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn full_name_falls_back_to_display_name_then_name() {
        let record = StaffRecord {
            display_name: Some("Jane Doe".into()),
            name: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(record.full_name().as_deref(), Some("Jane Doe"));

        let record = StaffRecord {
            name: Some("J. Doe".into()),
            ..Default::default()
        };
        assert_eq!(record.full_name().as_deref(), Some("J. Doe"));

        let record = StaffRecord::default();
        assert_eq!(record.full_name(), None);
    }

    #[test]
    fn assignment_slot_trims_and_drops_empty() {
        let assignments = StaffAssignments {
            doctor: Some("  D1  ".into()),
            nurse: Some("   ".into()),
            buddy: None,
        };
        assert_eq!(assignments.slot(StaffRole::Doctor), Some("D1"));
        assert_eq!(assignments.slot(StaffRole::Nurse), None);
        assert_eq!(assignments.slot(StaffRole::Buddy), None);
    }

    #[test]
    fn patient_deserializes_camel_case_assignments() {
        let patient: Patient = serde_json::from_value(serde_json::json!({
            "id": "P1",
            "name": "Pat Example",
            "assignedDoctor": "D1",
            "assignedNurse": "Nurse Jane Doe"
        }))
        .unwrap();
        assert_eq!(patient.assigned_doctor.as_deref(), Some("D1"));
        assert_eq!(patient.assigned_nurse.as_deref(), Some("Nurse Jane Doe"));
        assert_eq!(patient.assigned_buddy, None);
    }
}
