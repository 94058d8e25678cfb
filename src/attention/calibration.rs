//! Four-corner gaze calibration.
//!
//! Walks the user through fixating the four corners of the viewing
//! area and converts the four captured gaze ratios into a padded
//! bounds box. The calibrator resets itself after the fourth capture,
//! success or failure, so one instance serves repeated sessions.

use std::fmt;

use tracing::{debug, info, warn};

use super::geometry::GazeRatio;
use super::spatial::CalibrationBounds;

/// Padding added beyond the sampled min/max on each axis, in
/// gaze-ratio units.
const BOUNDS_PADDING: f64 = 0.02;

/// Number of fixation targets.
const CORNER_COUNT: usize = 4;

// ── CalibrationCorner ───────────────────────────────────────

/// Fixation targets, visited in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl CalibrationCorner {
    /// Corner for a 0-based step, while steps remain.
    pub fn from_step(step: usize) -> Option<Self> {
        match step {
            0 => Some(Self::TopLeft),
            1 => Some(Self::TopRight),
            2 => Some(Self::BottomLeft),
            3 => Some(Self::BottomRight),
            _ => None,
        }
    }

    /// String representation for prompts and status reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

// ── CalibrationError ────────────────────────────────────────

/// Why a completed capture sequence produced no usable bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// All four samples share one horizontal ratio — zero-width axis.
    DegenerateHorizontal,
    /// All four samples share one vertical ratio — zero-height axis.
    DegenerateVertical,
    /// A captured sample carried a non-finite coordinate.
    NonFiniteSample,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::DegenerateHorizontal => {
                "calibration samples span zero width horizontally"
            }
            Self::DegenerateVertical => {
                "calibration samples span zero width vertically"
            }
            Self::NonFiniteSample => "calibration sample was not finite",
        };
        write!(f, "{msg}")
    }
}

impl std::error::Error for CalibrationError {}

// ── CaptureOutcome ──────────────────────────────────────────

/// Result of one capture request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaptureOutcome {
    /// No gaze sample was available; the step did not advance.
    NoSample,
    /// Sample recorded; `next` is the corner to fixate now.
    Pending { next: CalibrationCorner },
    /// Fourth sample recorded and bounds computed.
    Complete(CalibrationBounds),
    /// Fourth sample recorded but the samples are unusable; retry.
    Failed(CalibrationError),
}

// ── Calibrator ──────────────────────────────────────────────

/// Collects four corner gaze samples and produces `CalibrationBounds`.
pub struct Calibrator {
    samples: Vec<(f64, f64)>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self {
            samples: Vec::with_capacity(CORNER_COUNT),
        }
    }

    /// 0-based step counter; equals the number of recorded samples.
    pub fn step(&self) -> usize {
        self.samples.len()
    }

    /// The corner the user should fixate for the next capture.
    pub fn current_corner(&self) -> Option<CalibrationCorner> {
        CalibrationCorner::from_step(self.step())
    }

    /// Record one gaze sample for the current corner.
    ///
    /// A capture without an available ratio is a no-op — calibrating
    /// from stale or absent geometry would bake a bogus corner into
    /// the bounds. The fourth successful capture finalizes and resets
    /// this instance for reuse.
    pub fn capture(&mut self, ratio: Option<&GazeRatio>) -> CaptureOutcome {
        let ratio = match ratio {
            Some(r) => r,
            None => {
                debug!("calibration capture skipped: no gaze sample");
                return CaptureOutcome::NoSample;
            }
        };

        self.samples.push((ratio.x, ratio.y));
        if self.samples.len() < CORNER_COUNT {
            let next = CalibrationCorner::from_step(self.samples.len())
                .unwrap_or(CalibrationCorner::BottomRight);
            debug!(
                "calibration point {}/{} captured; next corner {}",
                self.samples.len(),
                CORNER_COUNT,
                next.as_str(),
            );
            return CaptureOutcome::Pending { next };
        }

        let result = Self::finalize(&self.samples);
        self.samples.clear();
        match result {
            Ok(bounds) => {
                info!(
                    "calibration complete: x [{:.3}, {:.3}] y [{:.3}, {:.3}]",
                    bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y,
                );
                CaptureOutcome::Complete(bounds)
            }
            Err(e) => {
                warn!("calibration invalid, retry: {e}");
                CaptureOutcome::Failed(e)
            }
        }
    }

    /// Discard any recorded samples and start over at the first corner.
    pub fn reset(&mut self) {
        self.samples.clear();
    }

    fn finalize(samples: &[(f64, f64)]) -> Result<CalibrationBounds, CalibrationError> {
        if samples
            .iter()
            .any(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(CalibrationError::NonFiniteSample);
        }

        let min_x = samples.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
        let max_x = samples.iter().map(|(x, _)| *x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = samples.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
        let max_y = samples.iter().map(|(_, y)| *y).fold(f64::NEG_INFINITY, f64::max);

        if max_x - min_x < f64::EPSILON {
            return Err(CalibrationError::DegenerateHorizontal);
        }
        if max_y - min_y < f64::EPSILON {
            return Err(CalibrationError::DegenerateVertical);
        }

        Ok(CalibrationBounds {
            min_x: min_x - BOUNDS_PADDING,
            max_x: max_x + BOUNDS_PADDING,
            min_y: min_y - BOUNDS_PADDING,
            max_y: max_y + BOUNDS_PADDING,
        })
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}
