//! Delayed-task scheduler for future-dated notifications.
//!
//! Scheduled dispatch is a process-local tokio timer: it does not survive
//! a restart of the hosting process. Tasks are tracked by notification id
//! so a pending timer can at least be cancelled, which the fire-and-forget
//! timers this replaces could not.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

/// Tracks pending delayed tasks keyed by notification id.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Mutex<HashMap<Uuid, JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`. A task already scheduled under the same
    /// id is replaced (and its timer aborted).
    pub fn schedule<F>(&self, id: Uuid, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        let mut tasks = self.tasks.lock().unwrap();
        // Finished entries accumulate between calls; sweep them here.
        tasks.retain(|_, h| !h.is_finished());
        if let Some(previous) = tasks.insert(id, handle) {
            previous.abort();
        }
        debug!(notification_id = %id, delay_ms = delay.as_millis() as u64, "Scheduled delayed task");
    }

    /// Cancel the pending task for `id`. Returns whether a still-pending
    /// timer was aborted.
    pub fn cancel(&self, id: Uuid) -> bool {
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.remove(&id) {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                debug!(notification_id = %id, "Cancelled scheduled task");
                true
            }
            _ => false,
        }
    }

    /// Number of tracked (possibly finished) tasks. For tests.
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }
}
