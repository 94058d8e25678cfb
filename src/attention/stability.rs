//! Stillness detection — the "zoning out" tracker.
//!
//! Watches *how much* the gaze moves: a rolling window of recent iris
//! positions is reduced to a movement score (mean distance from the
//! window mean), and a sustained score below the stillness threshold
//! debounces into a single zone-out trigger. Staring at one point for
//! ten seconds straight is a better disengagement proxy than any
//! single frame.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::landmarks::Point;
use super::timer::DebounceTimer;
use crate::clock::Clock;

/// External trigger invoked when sustained stillness fires.
pub type StillnessCallback = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

// ── StabilityConfig ─────────────────────────────────────────

/// Stillness detection tuning.
#[derive(Debug, Clone)]
pub struct StabilityConfig {
    /// Number of recent positions in the rolling window.
    pub window: usize,
    /// Movement score below which the gaze counts as still.
    pub stillness_threshold: f64,
    /// How long stillness must persist uninterrupted before firing.
    pub dwell: Duration,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window: 60,
            stillness_threshold: 0.0008,
            dwell: Duration::from_millis(10_000),
        }
    }
}

// ── StabilityTracker ────────────────────────────────────────

/// Debounces low gaze variance into a single-fire zone-out event.
pub struct StabilityTracker {
    pub config: StabilityConfig,
    /// Sliding window of recent iris positions; oldest evicted past
    /// capacity.
    buffer: VecDeque<Point>,
    timer: DebounceTimer,
    /// Latched true after the timer fires; cleared by motion.
    zoning_out: bool,
    on_sustained_stillness: StillnessCallback,
}

impl StabilityTracker {
    pub fn new(
        config: StabilityConfig,
        clock: Arc<dyn Clock>,
        on_sustained_stillness: StillnessCallback,
    ) -> Self {
        let window = config.window;
        Self {
            config,
            buffer: VecDeque::with_capacity(window),
            timer: DebounceTimer::new(clock),
            zoning_out: false,
            on_sustained_stillness,
        }
    }

    /// Feed one frame's iris position; returns the instantaneous
    /// movement score for observability and threshold tuning.
    ///
    /// Entering stillness arms the dwell timer; any motion cancels it
    /// and clears the zoned-out latch, even if the trigger had already
    /// fired.
    pub fn observe(&mut self, position: Point) -> f64 {
        self.buffer.push_back(position);
        if self.buffer.len() > self.config.window {
            self.buffer.pop_front();
        }

        let score = self.movement_score();

        if score < self.config.stillness_threshold {
            if !self.zoning_out && !self.timer.is_armed() {
                debug!("gaze still (score {:.6}); starting zone-out dwell", score);
                self.timer.arm(self.config.dwell);
            }
        } else {
            self.timer.cancel();
            if self.zoning_out {
                info!("gaze motion resumed; zone-out cleared");
            }
            self.zoning_out = false;
        }

        score
    }

    /// Mean Euclidean distance of buffered positions from their mean.
    fn movement_score(&self) -> f64 {
        if self.buffer.is_empty() {
            return 0.0;
        }
        let n = self.buffer.len() as f64;
        let avg_x = self.buffer.iter().map(|p| p.x).sum::<f64>() / n;
        let avg_y = self.buffer.iter().map(|p| p.y).sum::<f64>() / n;

        self.buffer
            .iter()
            .map(|p| ((p.x - avg_x).powi(2) + (p.y - avg_y).powi(2)).sqrt())
            .sum::<f64>()
            / n
    }

    /// Fire the dwell timer if due. Called once per tick, also on
    /// frames without a face, so the countdown keeps running.
    pub fn poll(&mut self) {
        if self.timer.fire_due() {
            self.zoning_out = true;
            info!("sustained stillness detected; firing zone-out trigger");
            if let Err(e) = (self.on_sustained_stillness)() {
                warn!("zone-out trigger failed: {e:#}");
            }
        }
    }

    /// Whether the stillness condition has fired and not since been
    /// interrupted by motion.
    pub fn is_zoning_out(&self) -> bool {
        self.zoning_out
    }

    /// Number of buffered positions.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Status s-expression for observability.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:zoning-out {} :dwell-armed {} :buffer-len {} :movement-score {:.6})",
            if self.zoning_out { "t" } else { "nil" },
            if self.timer.is_armed() { "t" } else { "nil" },
            self.buffer.len(),
            self.movement_score(),
        )
    }
}
