use super::{ScheduleError, TaskScheduler, TimerId};
use std::time::Duration;

/// Trailing-edge debouncer over a `TaskScheduler`.
///
/// Every `trigger` cancels the live timer and starts a new one, so the task
/// runs once after `window` of quiet.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    pending: Option<TimerId>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Restarts the quiet window.
    ///
    /// On error the previous timer is already cancelled and nothing is
    /// pending.
    pub fn trigger<T: TaskScheduler + ?Sized>(
        &mut self,
        scheduler: &mut T,
    ) -> Result<TimerId, ScheduleError> {
        if let Some(previous) = self.pending.take() {
            scheduler.cancel(previous);
        }
        let id = scheduler.schedule(self.window)?;
        self.pending = Some(id);
        Ok(id)
    }

    /// Accepts a fired timer. Returns `true` only for the live timer.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Cancels the live timer. Returns whether one was pending.
    pub fn cancel<T: TaskScheduler + ?Sized>(&mut self, scheduler: &mut T) -> bool {
        match self.pending.take() {
            Some(id) => {
                scheduler.cancel(id);
                true
            }
            None => false,
        }
    }
}
