//! Gaze-ratio extraction from raw landmark points.
//!
//! Derives a dimensionless iris position within the eye's horizontal
//! and vertical span. Pure arithmetic, no clamping — ratios can leave
//! [0,1] when the eye is rotated extremely.

use super::landmarks::{
    LandmarkSet, Point, INNER_CORNER, IRIS_CENTER, LOWER_LID, MIN_LANDMARKS, OUTER_CORNER,
    UPPER_LID,
};

// ── GazeRatio ───────────────────────────────────────────────

/// Iris position relative to the eye-corner/lid span, recomputed
/// every frame and never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeRatio {
    /// Horizontal ratio: 0.5 is centered, lower toward the inner corner.
    pub x: f64,
    /// Vertical ratio: 0.5 is centered, higher means looking down.
    pub y: f64,
    /// Absolute lid separation; near zero when the eye is closed.
    pub eye_openness: f64,
}

/// Extract the gaze ratio from one frame's landmarks.
///
/// Returns `None` when the set is too short for the required indices,
/// when an eye span is zero-width, or when any required coordinate is
/// non-finite. Callers must treat `None` as "skip this tick", never as
/// a default position — substituting zeros reads as a fixed stare.
pub fn gaze_ratio(landmarks: &LandmarkSet) -> Option<GazeRatio> {
    if landmarks.len() < MIN_LANDMARKS {
        return None;
    }
    let iris = landmarks.get(IRIS_CENTER)?;
    let inner = landmarks.get(INNER_CORNER)?;
    let outer = landmarks.get(OUTER_CORNER)?;
    let upper = landmarks.get(UPPER_LID)?;
    let lower = landmarks.get(LOWER_LID)?;

    let h_span = outer.x - inner.x;
    let v_span = lower.y - upper.y;
    if h_span == 0.0 || v_span == 0.0 {
        return None;
    }

    let ratio = GazeRatio {
        x: (iris.x - inner.x) / h_span,
        y: (iris.y - upper.y) / v_span,
        eye_openness: (upper.y - lower.y).abs(),
    };
    if !ratio.x.is_finite() || !ratio.y.is_finite() || !ratio.eye_openness.is_finite() {
        return None;
    }
    Some(ratio)
}

/// Raw iris landmark position, the input to stillness tracking.
///
/// The stability buffer holds these raw coordinates rather than the
/// ratio; the stillness threshold is tuned against them.
pub fn iris_position(landmarks: &LandmarkSet) -> Option<Point> {
    if landmarks.len() < MIN_LANDMARKS {
        return None;
    }
    landmarks.get(IRIS_CENTER)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eye_landmarks(iris: Point, inner: Point, outer: Point, upper: Point, lower: Point) -> LandmarkSet {
        let mut points = vec![Point::new(0.5, 0.5); MIN_LANDMARKS];
        points[IRIS_CENTER] = iris;
        points[INNER_CORNER] = inner;
        points[OUTER_CORNER] = outer;
        points[UPPER_LID] = upper;
        points[LOWER_LID] = lower;
        LandmarkSet::new(points)
    }

    #[test]
    fn test_centered_iris_yields_half_ratios() {
        let set = eye_landmarks(
            Point::new(0.35, 0.35),
            Point::new(0.30, 0.30),
            Point::new(0.40, 0.30),
            Point::new(0.35, 0.30),
            Point::new(0.35, 0.40),
        );
        let ratio = gaze_ratio(&set).expect("geometry available");
        assert!((ratio.x - 0.5).abs() < 1e-9);
        assert!((ratio.y - 0.5).abs() < 1e-9);
        assert!((ratio.eye_openness - 0.10).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let set = eye_landmarks(
            Point::new(0.33, 0.37),
            Point::new(0.30, 0.30),
            Point::new(0.40, 0.30),
            Point::new(0.35, 0.32),
            Point::new(0.35, 0.41),
        );
        let a = gaze_ratio(&set).unwrap();
        let b = gaze_ratio(&set).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_ratio_not_clamped() {
        // Iris outside the corner span — ratio exceeds 1.0.
        let set = eye_landmarks(
            Point::new(0.45, 0.35),
            Point::new(0.30, 0.30),
            Point::new(0.40, 0.30),
            Point::new(0.35, 0.30),
            Point::new(0.35, 0.40),
        );
        let ratio = gaze_ratio(&set).unwrap();
        assert!(ratio.x > 1.0);
    }

    #[test]
    fn test_short_set_yields_none() {
        let set = LandmarkSet::new(vec![Point::new(0.5, 0.5); 100]);
        assert!(gaze_ratio(&set).is_none());
        assert!(iris_position(&set).is_none());
    }

    #[test]
    fn test_zero_width_span_yields_none() {
        let set = eye_landmarks(
            Point::new(0.35, 0.35),
            Point::new(0.30, 0.30),
            Point::new(0.30, 0.30), // outer == inner
            Point::new(0.35, 0.30),
            Point::new(0.35, 0.40),
        );
        assert!(gaze_ratio(&set).is_none());
    }

    #[test]
    fn test_non_finite_coordinate_yields_none() {
        let set = eye_landmarks(
            Point::new(f64::NAN, 0.35),
            Point::new(0.30, 0.30),
            Point::new(0.40, 0.30),
            Point::new(0.35, 0.30),
            Point::new(0.35, 0.40),
        );
        assert!(gaze_ratio(&set).is_none());
    }

    #[test]
    fn test_iris_position_passthrough() {
        let set = eye_landmarks(
            Point::new(0.33, 0.37),
            Point::new(0.30, 0.30),
            Point::new(0.40, 0.30),
            Point::new(0.35, 0.32),
            Point::new(0.35, 0.41),
        );
        assert_eq!(iris_position(&set), Some(Point::new(0.33, 0.37)));
    }
}
