//! Notifications Domain
//!
//! Typed in-app notification records with priority-based presentation,
//! read/acknowledgment tracking, scheduled dispatch, and an hourly expiry
//! sweep.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │    Orchestrator   │  ← emergency / assignment / progress events
//! └─────────┬─────────┘
//!           │ create()
//! ┌─────────▼─────────┐
//! │ NotificationSvc   │  ← validate, persist (pending), notify subscribers
//! └─────────┬─────────┘
//!           │ enqueue (now or via Scheduler)
//! ┌─────────▼─────────┐
//! │    Dispatcher     │  ← mark sent, toast by priority, callbacks
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐
//! │     ToastSink     │  ← UI seam (log sink outside a UI)
//! └───────────────────┘
//! ```
//!
//! The `read_by`/`acknowledged_by` sets on a notification are
//! authoritative; the single `status` value is a best-effort display
//! summary and the two can disagree once several viewers interact with
//! the same record. Notifications are never deleted by this crate.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod subscribers;

pub use config::NotificationConfig;
pub use dispatcher::{Dispatcher, LogToastSink, RecordingToastSink, Toast, ToastSink, ToastStyle};
pub use error::{NotificationError, NotificationResult};
pub use models::{
    CreateNotification, Notification, NotificationFilter, NotificationPriority, NotificationStats,
    NotificationStatus, NotificationType, RelatedEntity,
};
pub use repository::{InMemoryNotificationRepository, NotificationRepository};
pub use scheduler::Scheduler;
pub use service::NotificationService;
pub use subscribers::{SubscriberCallback, SubscriberRegistry, Subscription};
