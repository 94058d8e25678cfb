//! Single-shot debounce timer.
//!
//! Armed when a violation condition is entered, cancelled the instant
//! it clears, fires exactly once per arming if the deadline passes.
//! Deadlines are absolute instants against an injected clock, so the
//! timer is polled from the tick loop — firing is serialized with
//! frame processing by construction, and irregular tick intervals do
//! not skew the dwell.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::clock::Clock;

/// An armed/disarmed single-shot timer with an absolute deadline.
///
/// At most one deadline is outstanding at a time; `arm` while armed is
/// a no-op, and `cancel` clears the deadline deterministically — a
/// cancelled timer can never fire.
pub struct DebounceTimer {
    clock: Arc<dyn Clock>,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            deadline: None,
        }
    }

    /// Arm the timer `dwell` from now. No-op when already armed — the
    /// original deadline stands.
    pub fn arm(&mut self, dwell: Duration) {
        if self.deadline.is_some() {
            return;
        }
        self.deadline = Some(self.clock.now() + dwell);
        debug!("debounce timer armed for {:?}", dwell);
    }

    /// Disarm. A subsequent `fire_due` cannot fire.
    pub fn cancel(&mut self) {
        if self.deadline.take().is_some() {
            debug!("debounce timer cancelled");
        }
    }

    /// Whether a deadline is outstanding.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed, then
    /// disarms.
    pub fn fire_due(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
