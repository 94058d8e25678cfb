//! Scripted frame delivery for integration testing and trace replay.
//!
//! Provides `FrameEvent` and `FrameProvider` so tests and the binary
//! can drive the whole pipeline through a pre-defined sequence without
//! a camera or detector. Production embeddings feed `FocusController`
//! directly from their detector callback.

use std::collections::VecDeque;
use std::time::Duration;

use crate::attention::landmarks::{
    ExpressionScores, Frame, LandmarkSet, Point, INNER_CORNER, IRIS_CENTER, LOOK_DOWN_LEFT,
    LOWER_LID, MIN_LANDMARKS, OUTER_CORNER, UPPER_LID,
};

// ── Synthetic landmarks ─────────────────────────────────────

/// Build a minimal landmark set whose five semantic points produce
/// exactly the requested gaze ratio and lid separation. Every other
/// index is filler.
pub fn synthetic_landmarks(x_ratio: f64, y_ratio: f64, openness: f64) -> LandmarkSet {
    let inner = Point::new(0.30, 0.30);
    let outer = Point::new(0.40, 0.30);
    let upper = Point::new(0.35, 0.30);
    let lower = Point::new(0.35, 0.30 + openness);
    let iris = Point::new(
        inner.x + x_ratio * (outer.x - inner.x),
        upper.y + y_ratio * (lower.y - upper.y),
    );

    let mut points = vec![Point::new(0.5, 0.5); MIN_LANDMARKS];
    points[IRIS_CENTER] = iris;
    points[INNER_CORNER] = inner;
    points[OUTER_CORNER] = outer;
    points[UPPER_LID] = upper;
    points[LOWER_LID] = lower;
    LandmarkSet::new(points)
}

/// A full synthetic frame: landmarks plus a downward-look expression
/// score.
pub fn synthetic_frame(x_ratio: f64, y_ratio: f64, openness: f64, look_down_score: f64) -> Frame {
    let expressions = if look_down_score > 0.0 {
        ExpressionScores::from_pairs(vec![(LOOK_DOWN_LEFT.to_string(), look_down_score)])
    } else {
        ExpressionScores::none()
    };
    Frame::new(synthetic_landmarks(x_ratio, y_ratio, openness), expressions)
}

// ── FrameEvent ──────────────────────────────────────────────

/// One step of a scripted session.
#[derive(Debug, Clone)]
pub enum FrameEvent {
    /// A detected face, described at the gaze-ratio level.
    Face {
        x_ratio: f64,
        y_ratio: f64,
        openness: f64,
        look_down_score: f64,
    },
    /// A tick in which the detector found no face.
    NoFace,
    /// Advance time between frames (used in scripted sequences).
    Wait { duration: Duration },
}

impl FrameEvent {
    /// The frame this event delivers, if any.
    pub fn to_frame(&self) -> Option<Frame> {
        match self {
            Self::Face {
                x_ratio,
                y_ratio,
                openness,
                look_down_score,
            } => Some(synthetic_frame(*x_ratio, *y_ratio, *openness, *look_down_score)),
            Self::NoFace => None,
            Self::Wait { .. } => None,
        }
    }
}

// ── FrameProvider ───────────────────────────────────────────

/// Trait for delivering frame events to the pipeline.
pub trait FrameProvider: Send {
    /// Get the next event, if any.
    fn next_event(&mut self) -> Option<FrameEvent>;
    /// Whether there are more events to deliver.
    fn has_events(&self) -> bool;
}

/// A scripted provider that delivers events from a pre-defined queue.
pub struct ScriptedFrameProvider {
    events: VecDeque<FrameEvent>,
}

impl ScriptedFrameProvider {
    /// Create from a vector of events.
    pub fn new(events: Vec<FrameEvent>) -> Self {
        Self {
            events: VecDeque::from(events),
        }
    }

    /// Number of remaining events.
    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl FrameProvider for ScriptedFrameProvider {
    fn next_event(&mut self) -> Option<FrameEvent> {
        self.events.pop_front()
    }

    fn has_events(&self) -> bool {
        !self.events.is_empty()
    }
}
