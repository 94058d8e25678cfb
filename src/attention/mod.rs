//! Attention inference — calibration, per-frame classification, and
//! temporal debouncing.
//!
//! Data flow per tick: landmark source → `geometry` →
//! { `calibration` during the calibration walk | `classifier` +
//! `stability` + `spatial` while monitoring } → status + at most one
//! trigger per violation episode. `controller` is the composition
//! root that runs the sequence.

pub mod calibration;
pub mod classifier;
pub mod controller;
pub mod geometry;
pub mod landmarks;
pub mod spatial;
pub mod stability;
pub mod timer;

pub use calibration::{CalibrationCorner, CalibrationError, Calibrator, CaptureOutcome};
pub use classifier::{classify, Classification, ClassifierConfig, FocusStatus};
pub use controller::{ControllerConfig, FocusController, TickStatus};
pub use geometry::{gaze_ratio, iris_position, GazeRatio};
pub use landmarks::{ExpressionScores, Frame, LandmarkSet, Point};
pub use spatial::{CalibrationBounds, SpatialConfig, SpatialFocusTracker};
pub use stability::{StabilityConfig, StabilityTracker};
