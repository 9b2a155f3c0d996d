//! Alerting Domain
//!
//! The three event-driven workflows of the care-team pipeline: emergency
//! alerts, staff-assignment notices, and progress updates. Each resolves
//! the relevant recipients through the directory, then fans out over the
//! in-app notification channel and the email channel with settle-all
//! semantics: per-recipient failures are tallied, never propagated.
//!
//! State sequence per event: triggered → recipients-resolved →
//! fanned-out → complete. None of it is persisted as such; the durable
//! traces are the notification records and the email audit entries. No
//! transaction spans the two channels, so a crash between them can leave
//! one side delivered — at-most-once per channel.

pub mod error;
pub mod models;
pub mod service;

pub use error::{AlertingError, AlertingResult};
pub use models::{
    AssignmentNotice, ChannelOutcome, EmergencyAlert, EmergencySeverity, FanoutReport,
};
pub use service::AlertingService;
