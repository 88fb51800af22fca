//! Cancellable deferred tasks and debouncing.
//!
//! # Responsibility
//! - Define the schedule/cancel contract hosts implement with their timers.
//! - Provide a virtual-time scheduler for tests and synchronous hosts.
//! - Coalesce bursts of triggers into one deferred task (`Debouncer`).
//!
//! # Invariants
//! - A cancelled timer never fires.
//! - A `Debouncer` has at most one live timer at a time.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

mod debounce;
mod manual;

pub use debounce::Debouncer;
pub use manual::ManualScheduler;

/// Opaque handle for one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl Display for TimerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The host refused to create a timer.
    Rejected(String),
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(details) => write!(f, "timer rejected by host: {details}"),
        }
    }
}

impl Error for ScheduleError {}

/// Host timer facility.
///
/// When a scheduled timer elapses the host reports it back to the owner
/// (for the state store: `StateStore::on_timer_fired`).
pub trait TaskScheduler {
    fn schedule(&mut self, delay: Duration) -> Result<TimerId, ScheduleError>;
    /// Cancels a timer. Unknown or already fired ids are ignored.
    fn cancel(&mut self, id: TimerId);
}
