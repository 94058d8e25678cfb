//! Per-frame focus classification from gaze geometry.
//!
//! Maps a single frame's gaze ratio (plus an optional expression
//! score) to a focus label. Stateless — temporal smoothing and
//! debouncing live in the trackers, not here.

use super::geometry::GazeRatio;

// ── FocusStatus ─────────────────────────────────────────────

/// Focus label produced once per frame.
///
/// Covers both producers: the per-frame classifier yields the first
/// three variants; the spatial tracker yields the last three plus
/// `Focused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusStatus {
    /// Gaze is on the viewing area.
    Focused,
    /// Horizontal ratio outside the central band.
    LookingAwaySide,
    /// Iris near the lower lid, or the detector reports a downward look.
    LookingDown,
    /// Gaze left the calibrated region.
    OutOfFocus,
    /// Lid separation below the closed threshold.
    EyesClosed,
    /// No calibration bounds installed, or no landmarks this frame.
    WaitingForCalibration,
}

impl FocusStatus {
    /// String representation for status reporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Focused => "focused",
            Self::LookingAwaySide => "looking-away-side",
            Self::LookingDown => "looking-down",
            Self::OutOfFocus => "out-of-focus",
            Self::EyesClosed => "eyes-closed",
            Self::WaitingForCalibration => "waiting-for-calibration",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "focused" => Some(Self::Focused),
            "looking-away-side" => Some(Self::LookingAwaySide),
            "looking-down" => Some(Self::LookingDown),
            "out-of-focus" => Some(Self::OutOfFocus),
            "eyes-closed" => Some(Self::EyesClosed),
            "waiting-for-calibration" => Some(Self::WaitingForCalibration),
            _ => None,
        }
    }
}

// ── ClassifierConfig ────────────────────────────────────────

/// Classification thresholds.
///
/// Tuning constants, not derived values; defaults match the shipped
/// behavior.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Horizontal ratio below which the gaze is off to one side.
    pub side_min: f64,
    /// Horizontal ratio above which the gaze is off to the other side.
    pub side_max: f64,
    /// Vertical ratio above which the iris is at the lower lid.
    pub down_ratio_threshold: f64,
    /// Expression score above which the detector's downward-look
    /// signal wins on its own.
    pub down_score_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            side_min: 0.35,
            side_max: 0.65,
            down_ratio_threshold: 0.8,
            down_score_threshold: 0.5,
        }
    }
}

// ── Classification ──────────────────────────────────────────

/// One frame's classification, with the ratios that produced it
/// (surfaced for threshold tuning).
#[derive(Debug, Clone, Copy)]
pub struct Classification {
    pub status: FocusStatus,
    pub horizontal: f64,
    pub vertical: f64,
}

/// Classify a single frame.
///
/// Checked in order, first match wins. The expression score is OR-ed
/// with the geometric vertical check so either signal alone can flag a
/// downward look — geometry degrades under poor lighting and extreme
/// head angles, the expression model does not.
pub fn classify(
    ratio: &GazeRatio,
    look_down_score: f64,
    config: &ClassifierConfig,
) -> Classification {
    let status = if ratio.x < config.side_min || ratio.x > config.side_max {
        FocusStatus::LookingAwaySide
    } else if ratio.y > config.down_ratio_threshold
        || look_down_score > config.down_score_threshold
    {
        FocusStatus::LookingDown
    } else {
        FocusStatus::Focused
    };

    Classification {
        status,
        horizontal: ratio.x,
        vertical: ratio.y,
    }
}
