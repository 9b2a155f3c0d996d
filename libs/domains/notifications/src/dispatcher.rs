//! Notification dispatch: pending queue, priority-based presentation,
//! subscriber delivery.
//!
//! The pending queue is an in-memory FIFO drained by a single
//! non-reentrant loop; an atomic flag prevents concurrent drains. This is
//! a guard against re-entry, not a lock: the host model is one process,
//! and dispatch holds no transaction across the notification and email
//! channels.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::NotificationResult;
use crate::models::{Notification, NotificationPriority, NotificationStatus};
use crate::repository::NotificationRepository;
use crate::subscribers::SubscriberRegistry;

/// How a toast is presented and dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastStyle {
    /// High-visibility interrupt that stays until dismissed by the user.
    PersistentInterrupt,
    /// Prominent, auto-dismissing after a longer interval.
    Prominent { auto_dismiss: Duration },
    /// Low-key auto-dismissing confirmation.
    Quiet { auto_dismiss: Duration },
}

/// Transient on-screen presentation of a dispatched notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub style: ToastStyle,
}

const PROMINENT_DISMISS: Duration = Duration::from_secs(10);
const QUIET_DISMISS: Duration = Duration::from_secs(4);

impl Toast {
    /// Presentation is selected by priority: critical/urgent interrupt and
    /// never auto-dismiss, high is prominent, the rest are quiet.
    pub fn for_notification(notification: &Notification) -> Self {
        let style = match notification.priority {
            NotificationPriority::Critical | NotificationPriority::Urgent => {
                ToastStyle::PersistentInterrupt
            }
            NotificationPriority::High => ToastStyle::Prominent {
                auto_dismiss: PROMINENT_DISMISS,
            },
            _ => ToastStyle::Quiet {
                auto_dismiss: QUIET_DISMISS,
            },
        };
        Self {
            title: notification.title.clone(),
            message: notification.message.clone(),
            priority: notification.priority,
            style,
        }
    }
}

/// UI seam for presenting toasts.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Toast sink that logs instead of rendering. The default outside a UI.
#[derive(Debug, Default)]
pub struct LogToastSink;

impl ToastSink for LogToastSink {
    fn show(&self, toast: Toast) {
        info!(
            title = %toast.title,
            priority = %toast.priority,
            style = ?toast.style,
            "Toast"
        );
    }
}

/// Toast sink that records everything shown. For tests.
#[derive(Debug, Default)]
pub struct RecordingToastSink {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingToastSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Vec<Toast> {
        self.toasts.lock().unwrap().clone()
    }
}

impl ToastSink for RecordingToastSink {
    fn show(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

/// Drains pending notifications into observable effects: a persisted
/// `sent` status, a toast, and synchronous subscriber callbacks.
pub struct Dispatcher {
    repository: Arc<dyn NotificationRepository>,
    subscribers: Arc<SubscriberRegistry>,
    sink: Arc<dyn ToastSink>,
    queue: Mutex<VecDeque<Uuid>>,
    draining: AtomicBool,
}

impl Dispatcher {
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        subscribers: Arc<SubscriberRegistry>,
        sink: Arc<dyn ToastSink>,
    ) -> Self {
        Self {
            repository,
            subscribers,
            sink,
            queue: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
        }
    }

    /// Queue a notification id for dispatch.
    pub fn enqueue(&self, id: Uuid) {
        self.queue.lock().unwrap().push_back(id);
    }

    /// Drain the pending queue. Re-entrant calls return immediately; the
    /// already-running drain will pick up whatever they enqueued.
    pub async fn drain(&self) {
        if self
            .draining
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        loop {
            let next = self.queue.lock().unwrap().pop_front();
            let Some(id) = next else { break };
            if let Err(err) = self.dispatch_one(id).await {
                error!(notification_id = %id, error = %err, "Dispatch failed");
            }
        }

        self.draining.store(false, Ordering::Release);
    }

    async fn dispatch_one(&self, id: Uuid) -> NotificationResult<()> {
        let Some(mut notification) = self.repository.get(id).await? else {
            debug!(notification_id = %id, "Queued notification no longer exists, skipping");
            return Ok(());
        };
        // A cancelled or already-dispatched notification stays untouched.
        if notification.status != NotificationStatus::Pending {
            debug!(
                notification_id = %id,
                status = %notification.status,
                "Queued notification is not pending, skipping"
            );
            return Ok(());
        }

        notification.status = NotificationStatus::Sent;
        notification.sent_at = Some(Utc::now());
        self.repository.update(notification.clone()).await?;

        self.sink.show(Toast::for_notification(&notification));

        let delivered = self.subscribers.notify(&notification);
        if delivered > 0 {
            notification.status = NotificationStatus::Delivered;
            self.repository.update(notification.clone()).await?;
        }

        info!(
            notification_id = %notification.id,
            recipient = %notification.recipient_id,
            priority = %notification.priority,
            delivered_subscribers = delivered,
            "Dispatched notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CreateNotification;
    use crate::repository::InMemoryNotificationRepository;

    fn dispatcher_with(
        repository: Arc<InMemoryNotificationRepository>,
        sink: Arc<RecordingToastSink>,
    ) -> Dispatcher {
        Dispatcher::new(repository, Arc::new(SubscriberRegistry::new()), sink)
    }

    async fn insert(
        repository: &InMemoryNotificationRepository,
        priority: NotificationPriority,
    ) -> Uuid {
        let mut spec = CreateNotification::new("R1", "T", "M");
        spec.priority = Some(priority);
        let n = spec.into_notification(Utc::now());
        let id = n.id;
        repository.insert(n).await.unwrap();
        id
    }

    #[tokio::test]
    async fn critical_is_persistent_and_low_auto_dismisses() {
        let repository = Arc::new(InMemoryNotificationRepository::new());
        let sink = Arc::new(RecordingToastSink::new());
        let dispatcher = dispatcher_with(repository.clone(), sink.clone());

        let critical = insert(&repository, NotificationPriority::Critical).await;
        let low = insert(&repository, NotificationPriority::Low).await;
        dispatcher.enqueue(critical);
        dispatcher.enqueue(low);
        dispatcher.drain().await;

        let toasts = sink.shown();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].style, ToastStyle::PersistentInterrupt);
        assert!(matches!(toasts[1].style, ToastStyle::Quiet { .. }));
    }

    #[tokio::test]
    async fn high_priority_is_prominent() {
        let repository = Arc::new(InMemoryNotificationRepository::new());
        let sink = Arc::new(RecordingToastSink::new());
        let dispatcher = dispatcher_with(repository.clone(), sink.clone());

        let id = insert(&repository, NotificationPriority::High).await;
        dispatcher.enqueue(id);
        dispatcher.drain().await;

        assert!(matches!(
            sink.shown()[0].style,
            ToastStyle::Prominent { .. }
        ));
    }

    #[tokio::test]
    async fn dispatch_marks_sent_with_timestamp() {
        let repository = Arc::new(InMemoryNotificationRepository::new());
        let sink = Arc::new(RecordingToastSink::new());
        let dispatcher = dispatcher_with(repository.clone(), sink);

        let id = insert(&repository, NotificationPriority::Medium).await;
        dispatcher.enqueue(id);
        dispatcher.drain().await;

        let stored = repository.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Sent);
        assert!(stored.sent_at.is_some());
    }

    #[tokio::test]
    async fn delivered_when_a_subscriber_received_it() {
        let repository = Arc::new(InMemoryNotificationRepository::new());
        let subscribers = Arc::new(SubscriberRegistry::new());
        let dispatcher = Dispatcher::new(
            repository.clone(),
            subscribers.clone(),
            Arc::new(RecordingToastSink::new()),
        );

        let _sub = subscribers.subscribe("R1", Arc::new(|_: &Notification| {}));
        let id = insert(&repository, NotificationPriority::Medium).await;
        dispatcher.enqueue(id);
        dispatcher.drain().await;

        let stored = repository.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Delivered);
    }

    #[tokio::test]
    async fn non_pending_notifications_are_skipped() {
        let repository = Arc::new(InMemoryNotificationRepository::new());
        let sink = Arc::new(RecordingToastSink::new());
        let dispatcher = dispatcher_with(repository.clone(), sink.clone());

        let id = insert(&repository, NotificationPriority::Medium).await;
        let mut stored = repository.get(id).await.unwrap().unwrap();
        stored.status = NotificationStatus::Expired;
        repository.update(stored).await.unwrap();

        dispatcher.enqueue(id);
        dispatcher.drain().await;

        assert!(sink.shown().is_empty());
        let stored = repository.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, NotificationStatus::Expired);
    }
}
