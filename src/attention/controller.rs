//! Composition root — feeds frames through the inference pipeline.
//!
//! Owns one of each component plus the shared clock, and runs the
//! per-tick sequence: classify, observe stillness, evaluate region
//! containment, poll both debounce timers. Timer polling happens on
//! every tick, including face-less ones, so a dropped face never
//! freezes a running countdown.

use std::sync::Arc;

use tracing::info;

use super::calibration::{Calibrator, CaptureOutcome};
use super::classifier::{classify, Classification, ClassifierConfig, FocusStatus};
use super::geometry;
use super::landmarks::{Frame, LandmarkSet, LOOK_DOWN_LEFT};
use super::spatial::{CalibrationBounds, PauseCallback, SpatialConfig, SpatialFocusTracker};
use super::stability::{StabilityConfig, StabilityTracker, StillnessCallback};
use crate::clock::Clock;

// ── ControllerConfig ────────────────────────────────────────

/// Aggregate tuning for the whole pipeline.
#[derive(Debug, Clone, Default)]
pub struct ControllerConfig {
    pub classifier: ClassifierConfig,
    pub stability: StabilityConfig,
    pub spatial: SpatialConfig,
}

// ── TickStatus ──────────────────────────────────────────────

/// What one tick produced.
#[derive(Debug, Clone, Copy)]
pub struct TickStatus {
    /// Per-frame classification; `None` when geometry was unavailable.
    pub classification: Option<Classification>,
    /// Region-containment status.
    pub spatial: FocusStatus,
    /// Instantaneous movement score; `None` when no iris was seen.
    pub movement_score: Option<f64>,
}

// ── FocusController ─────────────────────────────────────────

/// Drives the attention-inference pipeline, one frame per tick.
pub struct FocusController {
    classifier_config: ClassifierConfig,
    calibrator: Calibrator,
    stability: StabilityTracker,
    spatial: SpatialFocusTracker,
    /// Most recent landmarks, retained for calibration capture only.
    last_landmarks: Option<LandmarkSet>,
    /// Last classifier status, for change-only logging.
    last_logged: Option<FocusStatus>,
}

impl FocusController {
    pub fn new(
        config: ControllerConfig,
        clock: Arc<dyn Clock>,
        on_sustained_stillness: StillnessCallback,
        on_gaze_left_region: PauseCallback,
    ) -> Self {
        Self {
            classifier_config: config.classifier,
            calibrator: Calibrator::new(),
            stability: StabilityTracker::new(
                config.stability,
                clock.clone(),
                on_sustained_stillness,
            ),
            spatial: SpatialFocusTracker::new(config.spatial, clock, on_gaze_left_region),
            last_landmarks: None,
            last_logged: None,
        }
    }

    /// Process one tick.
    ///
    /// `frame` is `None` when the detector found no face; geometry-
    /// dependent work is skipped (never defaulted) but both timers are
    /// still polled.
    pub fn tick(&mut self, frame: Option<Frame>) -> TickStatus {
        let mut classification = None;
        let mut movement_score = None;

        let spatial = match frame {
            Some(frame) => {
                if let Some(ratio) = geometry::gaze_ratio(&frame.landmarks) {
                    let score = frame.expressions.score(LOOK_DOWN_LEFT);
                    let c = classify(&ratio, score, &self.classifier_config);
                    if self.last_logged != Some(c.status) {
                        info!("focus status: {}", c.status.as_str());
                        self.last_logged = Some(c.status);
                    }
                    classification = Some(c);
                }
                if let Some(iris) = geometry::iris_position(&frame.landmarks) {
                    movement_score = Some(self.stability.observe(iris));
                }
                let spatial = self.spatial.evaluate(Some(&frame.landmarks));
                self.last_landmarks = Some(frame.landmarks);
                spatial
            }
            None => {
                // A face-less tick invalidates the calibration cache:
                // capture must not consume stale geometry.
                self.last_landmarks = None;
                self.spatial.evaluate(None)
            }
        };

        self.stability.poll();
        self.spatial.poll();

        TickStatus {
            classification,
            spatial,
            movement_score,
        }
    }

    // ── Calibration API ─────────────────────────────────────

    /// Start (or restart) the four-corner calibration walk. Any
    /// installed bounds remain active until a new set completes.
    pub fn begin_calibration(&mut self) {
        self.calibrator.reset();
        info!("calibration started");
    }

    /// Capture the current gaze for the pending corner, consuming the
    /// most recently seen landmarks. Completion installs the bounds on
    /// the spatial tracker.
    pub fn capture_calibration_point(&mut self) -> CaptureOutcome {
        let ratio = self
            .last_landmarks
            .as_ref()
            .and_then(geometry::gaze_ratio);
        let outcome = self.calibrator.capture(ratio.as_ref());
        if let CaptureOutcome::Complete(bounds) = outcome {
            self.spatial.set_bounds(bounds);
        }
        outcome
    }

    /// Drop calibration progress and any installed bounds; the spatial
    /// tracker reports `waiting-for-calibration` until recalibrated.
    pub fn reset_calibration(&mut self) {
        self.calibrator.reset();
        self.spatial.clear_bounds();
        info!("calibration reset");
    }

    // ── Accessors ───────────────────────────────────────────

    pub fn is_calibrated(&self) -> bool {
        self.spatial.is_calibrated()
    }

    pub fn is_zoning_out(&self) -> bool {
        self.stability.is_zoning_out()
    }

    /// 0-based calibration step (number of corners captured so far).
    pub fn calibration_step(&self) -> usize {
        self.calibrator.step()
    }

    /// The installed bounds, if calibrated.
    pub fn calibration_bounds(&self) -> Option<CalibrationBounds> {
        self.spatial.bounds()
    }

    /// Aggregate status s-expression for observability.
    pub fn status_sexp(&self) -> String {
        format!(
            "(:calibrated {} :calibration-step {} :zoning-out {} :spatial {} :stability {})",
            if self.is_calibrated() { "t" } else { "nil" },
            self.calibrator.step(),
            if self.is_zoning_out() { "t" } else { "nil" },
            self.spatial.status_sexp(),
            self.stability.status_sexp(),
        )
    }
}
