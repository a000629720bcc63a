//! Deferred actions (status resets, level advance)
//!
//! Each entry carries the level generation token that was current when it was
//! scheduled. The session discards entries whose token is stale, so a timer
//! armed before a reset can never touch the next level.

/// Work to run later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Put the default status message back
    ResetStatus,
    /// Move on to the next level
    AdvanceLevel,
}

#[derive(Debug, Clone, PartialEq)]
struct Deferred {
    due_ms: f64,
    token: u64,
    action: DeferredAction,
}

/// Time-ordered queue of deferred actions
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Deferred>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once `delay_ms` has elapsed after `now_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, token: u64, action: DeferredAction) {
        let entry = Deferred {
            due_ms: now_ms + delay_ms,
            token,
            action,
        };
        // Keep sorted by due time, FIFO among equal times
        let index = self
            .pending
            .iter()
            .position(|d| d.due_ms > entry.due_ms)
            .unwrap_or(self.pending.len());
        self.pending.insert(index, entry);
    }

    /// Remove and return every entry due at `now_ms`, earliest first
    pub fn due(&mut self, now_ms: f64) -> Vec<(u64, DeferredAction)> {
        let split = self
            .pending
            .iter()
            .position(|d| d.due_ms > now_ms)
            .unwrap_or(self.pending.len());
        self.pending
            .drain(..split)
            .map(|d| (d.token, d.action))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
