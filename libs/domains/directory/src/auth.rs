//! Auth-provider seam.
//!
//! The hosting application signs users in through a managed auth service;
//! the core only needs the current identity (to stamp notification senders)
//! and basic profile read/update. `StaticAuth` is the in-memory stand-in.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::DirectoryResult;
use crate::models::{Identity, ProfileUpdate, StaffRecord};

/// Narrow view of the authentication provider.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in identity, if any.
    async fn current_identity(&self) -> DirectoryResult<Option<Identity>>;

    /// Read a user profile.
    async fn profile(&self, id: &str) -> DirectoryResult<Option<StaffRecord>>;

    /// Update profile fields for a user.
    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> DirectoryResult<()>;
}

/// In-memory [`AuthProvider`] with a fixed signed-in identity.
#[derive(Debug, Default, Clone)]
pub struct StaticAuth {
    identity: Option<Identity>,
    profiles: Arc<RwLock<HashMap<String, StaffRecord>>>,
}

impl StaticAuth {
    /// An auth provider with nobody signed in.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An auth provider with the given identity signed in.
    pub fn signed_in(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            identity: Some(Identity {
                id: id.into(),
                email: email.into(),
            }),
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_profile(self, record: StaffRecord) -> Self {
        {
            let mut profiles = self.profiles.write().unwrap();
            profiles.insert(record.id.clone(), record);
        }
        self
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_identity(&self) -> DirectoryResult<Option<Identity>> {
        Ok(self.identity.clone())
    }

    async fn profile(&self, id: &str) -> DirectoryResult<Option<StaffRecord>> {
        let profiles = self.profiles.read().unwrap();
        Ok(profiles.get(id).cloned())
    }

    async fn update_profile(&self, id: &str, update: ProfileUpdate) -> DirectoryResult<()> {
        let mut profiles = self.profiles.write().unwrap();
        let record = profiles.entry(id.to_string()).or_insert_with(|| StaffRecord {
            id: id.to_string(),
            ..Default::default()
        });
        if let Some(display_name) = update.display_name {
            record.display_name = Some(display_name);
        }
        if let Some(email) = update.email {
            record.email = Some(email);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signed_in_identity_is_visible() {
        let auth = StaticAuth::signed_in("U1", "u1@example.com");
        let identity = auth.current_identity().await.unwrap().unwrap();
        assert_eq!(identity.id, "U1");
        assert_eq!(identity.email, "u1@example.com");
    }

    #[tokio::test]
    async fn anonymous_has_no_identity() {
        let auth = StaticAuth::anonymous();
        assert!(auth.current_identity().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_profile_merges_fields() {
        let auth = StaticAuth::signed_in("U1", "u1@example.com");
        auth.update_profile(
            "U1",
            ProfileUpdate {
                display_name: Some("Jane Doe".into()),
                email: None,
            },
        )
        .await
        .unwrap();

        let profile = auth.profile("U1").await.unwrap().unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Jane Doe"));
    }
}
