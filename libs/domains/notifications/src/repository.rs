//! Repository seam for notification persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NotificationError, NotificationResult};
use crate::models::{Notification, NotificationFilter, NotificationStatus};

/// Persistence operations for notifications.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persist a new notification.
    async fn insert(&self, notification: Notification) -> NotificationResult<Notification>;

    /// Get a notification by id.
    async fn get(&self, id: Uuid) -> NotificationResult<Option<Notification>>;

    /// Replace a stored notification.
    async fn update(&self, notification: Notification) -> NotificationResult<Notification>;

    /// List a recipient's notifications matching the filter, newest first.
    async fn list_for_recipient(
        &self,
        recipient: &str,
        filter: &NotificationFilter,
    ) -> NotificationResult<Vec<Notification>>;

    /// List notifications whose `expires_at` lies at or before `cutoff`
    /// and that are not already expired.
    async fn expiring_before(&self, cutoff: DateTime<Utc>)
    -> NotificationResult<Vec<Notification>>;
}

/// In-memory implementation of [`NotificationRepository`] (for
/// development/testing).
#[derive(Debug, Default, Clone)]
pub struct InMemoryNotificationRepository {
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, notification: Notification) -> NotificationResult<Notification> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn get(&self, id: Uuid) -> NotificationResult<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id).cloned())
    }

    async fn update(&self, notification: Notification) -> NotificationResult<Notification> {
        let mut notifications = self.notifications.write().await;
        if !notifications.contains_key(&notification.id) {
            return Err(NotificationError::NotFound(notification.id));
        }
        notifications.insert(notification.id, notification.clone());
        Ok(notification)
    }

    async fn list_for_recipient(
        &self,
        recipient: &str,
        filter: &NotificationFilter,
    ) -> NotificationResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        let mut result: Vec<Notification> = notifications
            .values()
            .filter(|n| filter.matches(n, recipient))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn expiring_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> NotificationResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|n| n.status != NotificationStatus::Expired && n.is_expired_at(cutoff))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateNotification;
    use chrono::Duration;

    #[tokio::test]
    async fn update_of_unknown_id_is_not_found() {
        let repo = InMemoryNotificationRepository::new();
        let n = CreateNotification::new("R1", "T", "M").into_notification(Utc::now());
        let err = repo.update(n).await.unwrap_err();
        assert!(matches!(err, NotificationError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let repo = InMemoryNotificationRepository::new();
        let now = Utc::now();
        for i in 0..3 {
            let mut n =
                CreateNotification::new("R1", format!("T{i}"), "M").into_notification(now);
            n.created_at = now + Duration::seconds(i);
            repo.insert(n).await.unwrap();
        }

        let listed = repo
            .list_for_recipient("R1", &NotificationFilter::default())
            .await
            .unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].title, "T2");
        assert_eq!(listed[2].title, "T0");
    }

    #[tokio::test]
    async fn expiring_before_skips_already_expired() {
        let repo = InMemoryNotificationRepository::new();
        let now = Utc::now();

        let mut past = CreateNotification::new("R1", "old", "M").into_notification(now);
        past.expires_at = Some(now - Duration::hours(1));
        repo.insert(past).await.unwrap();

        let mut done = CreateNotification::new("R1", "done", "M").into_notification(now);
        done.expires_at = Some(now - Duration::hours(1));
        done.status = NotificationStatus::Expired;
        repo.insert(done).await.unwrap();

        let mut future = CreateNotification::new("R1", "future", "M").into_notification(now);
        future.expires_at = Some(now + Duration::hours(1));
        repo.insert(future).await.unwrap();

        let due = repo.expiring_before(now).await.unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "old");
    }
}
