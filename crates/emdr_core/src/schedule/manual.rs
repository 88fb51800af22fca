use super::{ScheduleError, TaskScheduler, TimerId};
use std::collections::BTreeMap;
use std::time::Duration;

/// Virtual-time scheduler driven by explicit `advance` calls.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerId, Duration>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since construction.
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Moves virtual time forward and returns timers that elapsed, ordered
    /// by deadline then id. Returned timers are no longer pending.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        self.now += by;
        let now = self.now;

        let mut due: Vec<(Duration, TimerId)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort();

        for (_, id) in &due {
            self.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}

impl TaskScheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> Result<TimerId, ScheduleError> {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.insert(id, self.now + delay);
        Ok(id)
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }
}
