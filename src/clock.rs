//! Clock abstraction for deterministic debounce testing.
//!
//! Production code uses `SystemClock` (real monotonic time).
//! Tests use `TestClock` with manual time advancement, so the 5 s and
//! 10 s debounce deadlines can be crossed without waiting.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Trait abstracting monotonic time for testability.
pub trait Clock: Send + Sync {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;
}

/// Production clock using real system time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Test clock with manually controlled time.
pub struct TestClock {
    instant: Mutex<Instant>,
}

impl TestClock {
    /// Create a test clock starting at the current real time.
    pub fn new() -> Self {
        Self {
            instant: Mutex::new(Instant::now()),
        }
    }

    /// Advance time by the given duration.
    pub fn advance(&self, duration: Duration) {
        let mut inst = self.instant.lock().unwrap();
        *inst += duration;
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> Instant {
        *self.instant.lock().unwrap()
    }
}
