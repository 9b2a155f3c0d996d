//! Directory Domain
//!
//! Patient and staff records, the document-store and auth seams, and the
//! staff resolver that maps a patient's assignment slots to contactable
//! identities.
//!
//! Assignment fields in patient records are not guaranteed to be valid
//! foreign keys: depending on where the data was entered they may hold a
//! staff record key or a human display name. [`StaffResolver`] tolerates
//! both through a layered fallback search (role-scoped records, the generic
//! user directory, then a case-insensitive name match).
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_directory::{InMemoryDirectory, StaffResolver, StaffRole};
//!
//! let directory = Arc::new(InMemoryDirectory::new().with_patient(patient));
//! let resolver = StaffResolver::new(directory, RetryPolicy::default());
//!
//! let contact = resolver.resolve("D1", StaffRole::Doctor).await;
//! ```

pub mod auth;
pub mod error;
pub mod models;
pub mod resolver;
pub mod store;

pub use auth::{AuthProvider, StaticAuth};
pub use error::{DirectoryError, DirectoryResult};
pub use models::{
    Contact, Identity, Patient, ProfileUpdate, Recipient, ResolvedCareTeam, StaffAssignments,
    StaffRecord, StaffRole,
};
pub use resolver::StaffResolver;
pub use store::{DirectoryStore, InMemoryDirectory};
