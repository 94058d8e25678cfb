//! Region containment — the "out of bounds" tracker.
//!
//! Watches *where* the gaze is: once calibrated, each frame's gaze
//! ratio is tested against the user's bounds box, and a sustained
//! excursion (or closed eyes) debounces into a single pause trigger.
//! Runs independently of the stillness tracker on the same frame
//! stream, with its own timer and its own trigger.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::classifier::FocusStatus;
use super::geometry;
use super::landmarks::LandmarkSet;
use super::timer::DebounceTimer;
use crate::clock::Clock;

/// External trigger invoked when the gaze has left the calibrated
/// region (or the eyes stayed closed) for the full dwell.
pub type PauseCallback = Box<dyn FnMut() -> anyhow::Result<()> + Send>;

// ── CalibrationBounds ───────────────────────────────────────

/// The padded rectangle of gaze-ratio space considered "looking at
/// the screen" for this user/session. Replaced wholesale on
/// recalibration; immutable between replacements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl CalibrationBounds {
    /// Inclusive containment — a ratio exactly on an edge is in bounds.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

// ── SpatialConfig ───────────────────────────────────────────

/// Region-containment tuning.
#[derive(Debug, Clone)]
pub struct SpatialConfig {
    /// Lid separation below which the eye counts as closed.
    pub eye_closed_threshold: f64,
    /// How long the violation must persist uninterrupted before the
    /// pause trigger fires.
    pub dwell: Duration,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            eye_closed_threshold: 0.005,
            dwell: Duration::from_millis(5_000),
        }
    }
}

// ── SpatialFocusTracker ─────────────────────────────────────

/// Debounces "gaze left the calibrated region" into a single-fire
/// pause trigger.
pub struct SpatialFocusTracker {
    pub config: SpatialConfig,
    bounds: Option<CalibrationBounds>,
    timer: DebounceTimer,
    /// Latched true after the timer fires; cleared on return to bounds.
    triggered: bool,
    on_gaze_left_region: PauseCallback,
}

impl SpatialFocusTracker {
    pub fn new(
        config: SpatialConfig,
        clock: Arc<dyn Clock>,
        on_gaze_left_region: PauseCallback,
    ) -> Self {
        Self {
            config,
            bounds: None,
            timer: DebounceTimer::new(clock),
            triggered: false,
            on_gaze_left_region,
        }
    }

    /// Evaluate one frame against the calibrated region.
    ///
    /// Without bounds, landmarks, or usable geometry this returns
    /// `WaitingForCalibration` and leaves any armed timer running — a
    /// dropped face must not reset an in-progress countdown.
    pub fn evaluate(&mut self, landmarks: Option<&LandmarkSet>) -> FocusStatus {
        let (bounds, landmarks) = match (self.bounds, landmarks) {
            (Some(b), Some(l)) => (b, l),
            _ => return FocusStatus::WaitingForCalibration,
        };
        let ratio = match geometry::gaze_ratio(landmarks) {
            Some(r) => r,
            None => return FocusStatus::WaitingForCalibration,
        };

        let eye_closed = ratio.eye_openness < self.config.eye_closed_threshold;
        let in_bounds = bounds.contains(ratio.x, ratio.y);

        if eye_closed || !in_bounds {
            if !self.triggered && !self.timer.is_armed() {
                debug!(
                    "gaze violation (closed: {}, ratio {:.3},{:.3}); starting pause dwell",
                    eye_closed, ratio.x, ratio.y,
                );
                self.timer.arm(self.config.dwell);
            }
            if eye_closed {
                FocusStatus::EyesClosed
            } else {
                FocusStatus::OutOfFocus
            }
        } else {
            self.timer.cancel();
            self.triggered = false;
            FocusStatus::Focused
        }
    }

    /// Fire the dwell timer if due. Called once per tick, also on
    /// frames without a face.
    pub fn poll(&mut self) {
        if self.timer.fire_due() {
            self.triggered = true;
            info!("gaze left the calibrated region; firing pause trigger");
            if let Err(e) = (self.on_gaze_left_region)() {
                warn!("pause trigger failed: {e:#}");
            }
        }
    }

    /// Install freshly calibrated bounds.
    pub fn set_bounds(&mut self, bounds: CalibrationBounds) {
        info!(
            "calibration bounds installed: x [{:.3}, {:.3}] y [{:.3}, {:.3}]",
            bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y,
        );
        self.bounds = Some(bounds);
        self.timer.cancel();
        self.triggered = false;
    }

    /// Drop the installed bounds; the tracker reports
    /// `WaitingForCalibration` until recalibrated.
    pub fn clear_bounds(&mut self) {
        self.bounds = None;
        self.timer.cancel();
        self.triggered = false;
    }

    pub fn is_calibrated(&self) -> bool {
        self.bounds.is_some()
    }

    pub fn bounds(&self) -> Option<CalibrationBounds> {
        self.bounds
    }

    /// Status s-expression for observability.
    pub fn status_sexp(&self) -> String {
        let bounds = match self.bounds {
            Some(b) => format!(
                "(:min-x {:.3} :max-x {:.3} :min-y {:.3} :max-y {:.3})",
                b.min_x, b.max_x, b.min_y, b.max_y,
            ),
            None => "nil".to_string(),
        };
        format!(
            "(:calibrated {} :dwell-armed {} :triggered {} :bounds {})",
            if self.bounds.is_some() { "t" } else { "nil" },
            if self.timer.is_armed() { "t" } else { "nil" },
            if self.triggered { "t" } else { "nil" },
            bounds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::TestClock;
    use crate::frame_source::synthetic_landmarks;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bounds() -> CalibrationBounds {
        CalibrationBounds {
            min_x: 0.18,
            max_x: 0.82,
            min_y: 0.18,
            max_y: 0.82,
        }
    }

    fn tracker(
        clock: Arc<TestClock>,
        fired: Arc<AtomicUsize>,
    ) -> SpatialFocusTracker {
        let mut t = SpatialFocusTracker::new(
            SpatialConfig::default(),
            clock,
            Box::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        t.set_bounds(bounds());
        t
    }

    #[test]
    fn test_uncalibrated_waits() {
        let clock = Arc::new(TestClock::new());
        let mut t = SpatialFocusTracker::new(
            SpatialConfig::default(),
            clock,
            Box::new(|| Ok(())),
        );
        let frame = synthetic_landmarks(0.5, 0.5, 0.1);
        assert!(!t.is_calibrated());
        assert_eq!(
            t.evaluate(Some(&frame)),
            FocusStatus::WaitingForCalibration,
        );
    }

    #[test]
    fn test_in_bounds_is_focused() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock, fired);
        let frame = synthetic_landmarks(0.5, 0.5, 0.1);
        assert_eq!(t.evaluate(Some(&frame)), FocusStatus::Focused);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock, fired);

        for (x, y) in [(0.18, 0.5), (0.82, 0.5), (0.5, 0.18), (0.5, 0.82)] {
            let frame = synthetic_landmarks(x, y, 0.1);
            assert_eq!(
                t.evaluate(Some(&frame)),
                FocusStatus::Focused,
                "ratio exactly at ({x}, {y}) must count as in bounds",
            );
        }
    }

    #[test]
    fn test_sustained_excursion_fires_once() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock.clone(), fired.clone());

        let away = synthetic_landmarks(0.95, 0.5, 0.1);
        assert_eq!(t.evaluate(Some(&away)), FocusStatus::OutOfFocus);
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        clock.advance(Duration::from_millis(5_000));
        t.evaluate(Some(&away));
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Still away long past another dwell: latched, no second fire.
        clock.advance(Duration::from_millis(20_000));
        t.evaluate(Some(&away));
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_return_before_deadline_cancels() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock.clone(), fired.clone());

        let away = synthetic_landmarks(0.95, 0.5, 0.1);
        let back = synthetic_landmarks(0.5, 0.5, 0.1);

        t.evaluate(Some(&away));
        clock.advance(Duration::from_millis(4_999));
        assert_eq!(t.evaluate(Some(&back)), FocusStatus::Focused);
        clock.advance(Duration::from_millis(10_000));
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 0, "cancelled before deadline");
    }

    #[test]
    fn test_releave_requires_fresh_dwell() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock.clone(), fired.clone());

        let away = synthetic_landmarks(0.95, 0.5, 0.1);
        let back = synthetic_landmarks(0.5, 0.5, 0.1);

        // First full episode.
        t.evaluate(Some(&away));
        clock.advance(Duration::from_millis(5_000));
        t.evaluate(Some(&away));
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        // Return, then leave again: a fresh 5 s is required.
        t.evaluate(Some(&back));
        t.evaluate(Some(&away));
        clock.advance(Duration::from_millis(4_999));
        t.evaluate(Some(&away));
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        clock.advance(Duration::from_millis(1));
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_eyes_closed_wins_over_out_of_bounds() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock, fired);

        // Out of bounds AND closed — closed is reported.
        let frame = synthetic_landmarks(0.95, 0.5, 0.003);
        assert_eq!(t.evaluate(Some(&frame)), FocusStatus::EyesClosed);
    }

    #[test]
    fn test_missing_face_leaves_timer_running() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock.clone(), fired.clone());

        let away = synthetic_landmarks(0.95, 0.5, 0.1);
        t.evaluate(Some(&away));

        // Face drops out; the dwell keeps counting.
        assert_eq!(t.evaluate(None), FocusStatus::WaitingForCalibration);
        clock.advance(Duration::from_millis(5_000));
        t.evaluate(None);
        t.poll();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_recalibration_resets_episode() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let mut t = tracker(clock.clone(), fired.clone());

        let away = synthetic_landmarks(0.95, 0.5, 0.1);
        t.evaluate(Some(&away));
        t.set_bounds(bounds());
        clock.advance(Duration::from_millis(10_000));
        t.poll();
        assert_eq!(
            fired.load(Ordering::SeqCst),
            0,
            "installing fresh bounds discards the pending dwell",
        );
    }

    #[test]
    fn test_failing_callback_keeps_state_consistent() {
        let clock = Arc::new(TestClock::new());
        let mut t = SpatialFocusTracker::new(
            SpatialConfig::default(),
            clock.clone(),
            Box::new(|| Err(anyhow::anyhow!("player unreachable"))),
        );
        t.set_bounds(bounds());

        let away = synthetic_landmarks(0.95, 0.5, 0.1);
        let back = synthetic_landmarks(0.5, 0.5, 0.1);

        t.evaluate(Some(&away));
        clock.advance(Duration::from_millis(5_000));
        t.poll();
        // Latch settled before the callback ran; recovery is normal.
        assert_eq!(t.evaluate(Some(&back)), FocusStatus::Focused);
        assert_eq!(t.evaluate(Some(&away)), FocusStatus::OutOfFocus);
    }

    #[test]
    fn test_status_sexp() {
        let clock = Arc::new(TestClock::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let t = tracker(clock, fired);
        let sexp = t.status_sexp();
        assert!(sexp.contains(":calibrated t"));
        assert!(sexp.contains(":min-x 0.180"));
    }
}
