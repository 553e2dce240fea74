//! Cancellable delayed events keyed by host time.
//!
//! Replaces callback-chained timeouts: the clock polls [`TimerQueue::due`]
//! each tick and handles the returned events in due order.

use crate::fighter::Team;

pub type TimerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Authoritative end of battle after the KO animation has been shown
    EndBattle { winner: Team },
    /// Remove one battle log entry
    ExpireLog { entry: u64 },
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    due_ms: f64,
    event: TimerEvent,
}

#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    timers: Vec<Timer>,
    next_id: TimerId,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, event: TimerEvent) -> TimerId {
        self.next_id += 1;
        let id = self.next_id;
        self.timers.push(Timer { id, due_ms, event });
        id
    }

    /// Cancel every timer whose event matches; returns how many were removed
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&TimerEvent) -> bool) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| !pred(&t.event));
        before - self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Remove and return every event due at `now_ms`, earliest first
    pub fn due(&mut self, now_ms: f64) -> Vec<TimerEvent> {
        let (mut fired, pending): (Vec<Timer>, Vec<Timer>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|t| t.due_ms <= now_ms);
        self.timers = pending;
        fired.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));
        fired.into_iter().map(|t| t.event).collect()
    }
}
