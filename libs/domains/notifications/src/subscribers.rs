//! Live subscriber registry.
//!
//! UI surfaces register a callback per recipient id and get every
//! notification addressed to that recipient, synchronously, as it is
//! created and dispatched. A panicking callback is caught and logged so
//! one bad subscriber cannot block delivery to the rest.

use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use crate::models::Notification;

/// Synchronous notification callback.
pub type SubscriberCallback = Arc<dyn Fn(&Notification) + Send + Sync>;

/// Registry of live subscriber callbacks keyed by recipient id.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<String, Vec<(u64, SubscriberCallback)>>>,
    next_token: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for a recipient. Dropping the returned
    /// [`Subscription`] does not unsubscribe; call
    /// [`Subscription::unsubscribe`].
    pub fn subscribe(
        self: &Arc<Self>,
        recipient_id: impl Into<String>,
        callback: SubscriberCallback,
    ) -> Subscription {
        let recipient_id = recipient_id.into();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        {
            let mut subscribers = self.subscribers.write().unwrap();
            subscribers
                .entry(recipient_id.clone())
                .or_default()
                .push((token, callback));
        }
        debug!(recipient = %recipient_id, token, "Subscriber registered");
        Subscription {
            registry: Arc::clone(self),
            recipient_id,
            token,
        }
    }

    /// Invoke every callback registered for the notification's recipient.
    /// Returns how many callbacks completed without panicking.
    pub fn notify(&self, notification: &Notification) -> usize {
        let callbacks: Vec<SubscriberCallback> = {
            let subscribers = self.subscribers.read().unwrap();
            subscribers
                .get(&notification.recipient_id)
                .map(|entries| entries.iter().map(|(_, cb)| cb.clone()).collect())
                .unwrap_or_default()
        };

        let mut delivered = 0;
        for callback in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(notification))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    error!(
                        notification_id = %notification.id,
                        recipient = %notification.recipient_id,
                        "Subscriber callback panicked; continuing with remaining subscribers"
                    );
                }
            }
        }
        delivered
    }

    fn unsubscribe(&self, recipient_id: &str, token: u64) {
        let mut subscribers = self.subscribers.write().unwrap();
        if let Some(entries) = subscribers.get_mut(recipient_id) {
            entries.retain(|(t, _)| *t != token);
            if entries.is_empty() {
                subscribers.remove(recipient_id);
            }
        }
    }
}

/// Handle for removing a registered subscriber callback.
pub struct Subscription {
    registry: Arc<SubscriberRegistry>,
    recipient_id: String,
    token: u64,
}

impl Subscription {
    pub fn unsubscribe(self) {
        self.registry.unsubscribe(&self.recipient_id, self.token);
        debug!(recipient = %self.recipient_id, token = self.token, "Subscriber removed");
    }
}
