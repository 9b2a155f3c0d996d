//! Notification service: create/query/read/acknowledge, scheduled
//! dispatch, and the expiry sweep.

use std::sync::Arc;
use std::time::Duration;

use backoff::retry;
use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::NotificationConfig;
use crate::dispatcher::{Dispatcher, ToastSink};
use crate::error::{NotificationError, NotificationResult};
use crate::models::{
    CreateNotification, Notification, NotificationFilter, NotificationStats, NotificationStatus,
};
use crate::repository::NotificationRepository;
use crate::scheduler::Scheduler;
use crate::subscribers::{SubscriberCallback, SubscriberRegistry, Subscription};

/// Service for creating and managing in-app notifications.
///
/// Repository calls are hardened with the configured retry policy.
/// Validation failures are programming errors and surface immediately,
/// without retries.
pub struct NotificationService {
    repository: Arc<dyn NotificationRepository>,
    subscribers: Arc<SubscriberRegistry>,
    dispatcher: Arc<Dispatcher>,
    scheduler: Scheduler,
    config: NotificationConfig,
}

impl NotificationService {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        sink: Arc<dyn ToastSink>,
        config: NotificationConfig,
    ) -> Arc<Self> {
        let subscribers = Arc::new(SubscriberRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(
            repository.clone(),
            subscribers.clone(),
            sink,
        ));
        Arc::new(Self {
            repository,
            subscribers,
            dispatcher,
            scheduler: Scheduler::new(),
            config,
        })
    }

    /// Create a notification: validate, persist (status pending), notify
    /// live subscribers, and dispatch — immediately, or after the
    /// `scheduled_for` delay.
    pub async fn create(&self, spec: CreateNotification) -> NotificationResult<Notification> {
        spec.validate()?;

        let now = Utc::now();
        let notification = spec.into_notification(now);
        let notification = retry(&self.config.retry, || {
            self.repository.insert(notification.clone())
        })
        .await?;

        info!(
            notification_id = %notification.id,
            recipient = %notification.recipient_id,
            notification_type = %notification.notification_type,
            priority = %notification.priority,
            "Created notification"
        );

        self.subscribers.notify(&notification);

        match notification.scheduled_for {
            Some(at) if at > now => {
                let delay = (at - now).to_std().unwrap_or(Duration::ZERO);
                let dispatcher = self.dispatcher.clone();
                let id = notification.id;
                self.scheduler.schedule(id, delay, async move {
                    dispatcher.enqueue(id);
                    dispatcher.drain().await;
                });
            }
            _ => {
                self.dispatcher.enqueue(notification.id);
                self.dispatcher.drain().await;
            }
        }

        Ok(notification)
    }

    /// Idempotently add `user_id` to the notification's `read_by` set.
    ///
    /// `status` moves to `read` only for the first reader; the sets, not
    /// `status`, are authoritative.
    pub async fn mark_read(&self, id: Uuid, user_id: &str) -> NotificationResult<Notification> {
        let mut notification = self.get_required(id).await?;
        if !notification.mark_read_by(user_id) {
            return Ok(notification);
        }
        if notification.read_by.len() == 1 {
            notification.status = NotificationStatus::Read;
        }
        retry(&self.config.retry, || {
            self.repository.update(notification.clone())
        })
        .await
    }

    /// Idempotently add `user_id` to the notification's `acknowledged_by`
    /// set; `status` becomes `acknowledged` as soon as anyone has.
    pub async fn acknowledge(&self, id: Uuid, user_id: &str) -> NotificationResult<Notification> {
        let mut notification = self.get_required(id).await?;
        if !notification.acknowledge_by(user_id) {
            return Ok(notification);
        }
        notification.status = NotificationStatus::Acknowledged;
        retry(&self.config.retry, || {
            self.repository.update(notification.clone())
        })
        .await
    }

    /// A recipient's notifications matching the filter, newest first.
    pub async fn notifications_for(
        &self,
        recipient: &str,
        filter: NotificationFilter,
    ) -> NotificationResult<Vec<Notification>> {
        retry(&self.config.retry, || {
            self.repository.list_for_recipient(recipient, &filter)
        })
        .await
    }

    /// Aggregate counts for a recipient.
    pub async fn stats(&self, recipient: &str) -> NotificationResult<NotificationStats> {
        let notifications = self
            .notifications_for(recipient, NotificationFilter::default())
            .await?;

        let mut stats = NotificationStats {
            total: notifications.len(),
            ..Default::default()
        };
        for n in &notifications {
            if !n.is_read_by(recipient) {
                stats.unread += 1;
            }
            if n.requires_acknowledgment && !n.is_acknowledged_by(recipient) {
                stats.unacknowledged += 1;
            }
            *stats.by_priority.entry(n.priority).or_insert(0) += 1;
        }
        Ok(stats)
    }

    /// Transition every notification past its `expires_at` to `expired`.
    /// Returns how many were transitioned.
    pub async fn expire_sweep(&self) -> NotificationResult<usize> {
        let now = Utc::now();
        let due = retry(&self.config.retry, || self.repository.expiring_before(now)).await?;

        let mut expired = 0;
        for mut notification in due {
            notification.status = NotificationStatus::Expired;
            match retry(&self.config.retry, || {
                self.repository.update(notification.clone())
            })
            .await
            {
                Ok(_) => expired += 1,
                Err(err) => {
                    warn!(notification_id = %notification.id, error = %err, "Failed to expire notification");
                }
            }
        }
        if expired > 0 {
            info!(expired, "Expiry sweep transitioned notifications");
        }
        Ok(expired)
    }

    /// Run [`Self::expire_sweep`] on the configured fixed interval until
    /// the shutdown channel flips to `true`.
    pub fn spawn_expiry_sweep(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(service.config.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so the first
            // sweep happens one interval after startup.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = service.expire_sweep().await {
                            error!(error = %err, "Expiry sweep failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Expiry sweep worker shutting down");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Register a live subscriber callback for a recipient.
    pub fn subscribe(&self, recipient: &str, callback: SubscriberCallback) -> Subscription {
        self.subscribers.subscribe(recipient, callback)
    }

    /// Cancel a scheduled (not yet dispatched) notification's timer.
    /// Returns whether a pending timer was aborted.
    pub fn cancel_scheduled(&self, id: Uuid) -> bool {
        self.scheduler.cancel(id)
    }

    async fn get_required(&self, id: Uuid) -> NotificationResult<Notification> {
        retry(&self.config.retry, || self.repository.get(id))
            .await?
            .ok_or(NotificationError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::RecordingToastSink;
    use crate::models::{NotificationPriority, NotificationType};
    use crate::repository::InMemoryNotificationRepository;
    use backoff::RetryPolicy;
    use chrono::Duration as ChronoDuration;

    fn service() -> (
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

    #[tokio::test]
    async fn create_persists_dispatches_and_toasts() {
        let (service, repository, sink) = service();

        let created = service
            .create(CreateNotification::new("R1", "Title", "Body"))
            .await
            .unwrap();

        let stored = repository.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert_eq!(sink.shown().len(), 1);
    }

    #[tokio::test]
    async fn create_rejects_empty_recipient_without_persisting() {
        let (service, repository, _) = service();

        let err = service
            .create(CreateNotification::new("", "Title", "Body"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::Validation(_)));

        let listed = repository
            .list_for_recipient("", &NotificationFilter::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn create_notifies_live_subscribers_synchronously() {
        let (service, _, _) = service();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

        let seen_cb = seen.clone();
        let _sub = service.subscribe(
            "R1",
            Arc::new(move |n: &Notification| seen_cb.lock().unwrap().push(n.title.clone())),
        );

        service
            .create(CreateNotification::new("R1", "Hello", "Body"))
            .await
            .unwrap();

        assert!(seen.lock().unwrap().contains(&"Hello".to_string()));
    }

    #[tokio::test]
    async fn mark_read_is_idempotent_and_sets_status_once() {
        let (service, _, _) = service();
        let created = service
            .create(CreateNotification::new("R1", "T", "M"))
            .await
            .unwrap();

        let first = service.mark_read(created.id, "U1").await.unwrap();
        assert_eq!(first.read_by, vec!["U1".to_string()]);
        assert_eq!(first.status, NotificationStatus::Read);

        let second = service.mark_read(created.id, "U1").await.unwrap();
        assert_eq!(second.read_by, vec!["U1".to_string()]);

        // A later reader appends but does not re-derive status.
        let third = service.mark_read(created.id, "U2").await.unwrap();
        assert_eq!(third.read_by.len(), 2);
    }

    #[tokio::test]
    async fn acknowledge_is_idempotent() {
        let (service, _, _) = service();
        let created = service
            .create(CreateNotification::new("R1", "T", "M"))
            .await
            .unwrap();

        let first = service.acknowledge(created.id, "U1").await.unwrap();
        assert_eq!(first.acknowledged_by, vec!["U1".to_string()]);
        assert_eq!(first.status, NotificationStatus::Acknowledged);

        let second = service.acknowledge(created.id, "U1").await.unwrap();
        assert_eq!(second.acknowledged_by, vec!["U1".to_string()]);
    }

    #[tokio::test]
    async fn mark_read_of_unknown_notification_is_not_found() {
        let (service, _, _) = service();
        let err = service.mark_read(Uuid::now_v7(), "U1").await.unwrap_err();
        assert!(matches!(err, NotificationError::NotFound(_)));
    }

    #[tokio::test]
    async fn stats_count_unread_and_unacknowledged() {
        let (service, _, _) = service();

        let mut emergency = CreateNotification::new("R1", "Emergency", "M");
        emergency.notification_type = Some(NotificationType::Emergency);
        emergency.priority = Some(NotificationPriority::Critical);
        emergency.requires_acknowledgment = true;
        let emergency = service.create(emergency).await.unwrap();

        let reminder = service
            .create(CreateNotification::new("R1", "Reminder", "M"))
            .await
            .unwrap();
        service.mark_read(reminder.id, "R1").await.unwrap();

        let stats = service.stats("R1").await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.unread, 1);
        assert_eq!(stats.unacknowledged, 1);
        assert_eq!(stats.by_priority[&NotificationPriority::Critical], 1);
        assert_eq!(stats.by_priority[&NotificationPriority::Medium], 1);

        service.acknowledge(emergency.id, "R1").await.unwrap();
        let stats = service.stats("R1").await.unwrap();
        assert_eq!(stats.unacknowledged, 0);
    }

    #[tokio::test]
    async fn expire_sweep_transitions_only_past_expiries() {
        let (service, repository, _) = service();
        let now = Utc::now();

        let mut past = CreateNotification::new("R1", "past", "M");
        past.expires_at = Some(now - ChronoDuration::hours(1));
        let past = service.create(past).await.unwrap();

        let mut future = CreateNotification::new("R1", "future", "M");
        future.expires_at = Some(now + ChronoDuration::hours(1));
        let future = service.create(future).await.unwrap();

        let expired = service.expire_sweep().await.unwrap();
        assert_eq!(expired, 1);

        let past = repository.get(past.id).await.unwrap().unwrap();
        assert_eq!(past.status, NotificationStatus::Expired);
        let future = repository.get(future.id).await.unwrap().unwrap();
        assert_ne!(future.status, NotificationStatus::Expired);

        // A second sweep finds nothing left to expire.
        assert_eq!(service.expire_sweep().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn scheduled_notification_dispatches_after_the_delay() {
        let (service, repository, sink) = service();

        let mut spec = CreateNotification::new("R1", "Later", "M");
        spec.scheduled_for = Some(Utc::now() + ChronoDuration::seconds(60));
        let created = service.create(spec).await.unwrap();

        assert!(sink.shown().is_empty());
        let stored = repository.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Pending);

        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        let stored = repository.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert_eq!(sink.shown().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_scheduled_notification_never_dispatches() {
        let (service, repository, sink) = service();

        let mut spec = CreateNotification::new("R1", "Later", "M");
        spec.scheduled_for = Some(Utc::now() + ChronoDuration::seconds(60));
        let created = service.create(spec).await.unwrap();

        assert!(service.cancel_scheduled(created.id));
        tokio::time::sleep(Duration::from_secs(120)).await;

        let stored = repository.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Pending);
        assert!(sink.shown().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_worker_runs_on_interval_and_stops_on_shutdown() {
        let repository = Arc::new(InMemoryNotificationRepository::new());
        let config = NotificationConfig {
            sweep_interval: Duration::from_secs(10),
            retry: RetryPolicy::no_retry(),
        };
        let service = NotificationService::new(
            repository.clone(),
            Arc::new(RecordingToastSink::new()),
            config,
        );

        let mut spec = CreateNotification::new("R1", "old", "M");
        spec.expires_at = Some(Utc::now() - ChronoDuration::hours(1));
        let created = service.create(spec).await.unwrap();

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = service.spawn_expiry_sweep(shutdown_rx);

        tokio::time::sleep(Duration::from_secs(11)).await;
        tokio::task::yield_now().await;

        let stored = repository.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Expired);

        shutdown_tx.send(true).unwrap();
        worker.await.unwrap();
    }
}
