//! Facial landmark data as delivered by the external detector.
//!
//! One `LandmarkSet` arrives per frame in which a face was found:
//! an ordered sequence of normalized [0,1] image-coordinate points,
//! indexed positionally. Only five semantic indices of the left eye
//! are consumed here; everything else passes through untouched.

// ── Semantic landmark indices (refined left eye) ────────────

/// Iris center of the left eye.
pub const IRIS_CENTER: usize = 468;
/// Inner corner of the left eye.
pub const INNER_CORNER: usize = 133;
/// Outer corner of the left eye.
pub const OUTER_CORNER: usize = 33;
/// Center of the upper eyelid.
pub const UPPER_LID: usize = 159;
/// Center of the lower eyelid.
pub const LOWER_LID: usize = 145;

/// Minimum landmark count for the refined iris index to exist.
pub const MIN_LANDMARKS: usize = 469;

/// Expression category for the left eye rotating downward.
pub const LOOK_DOWN_LEFT: &str = "eyeLookDownLeft";

// ── Point ───────────────────────────────────────────────────

/// A 2-D point in normalized image coordinates (z dropped at ingestion).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// ── LandmarkSet ─────────────────────────────────────────────

/// One frame's facial landmarks, positionally indexed.
///
/// Owned by the current tick; the controller retains only the most
/// recent set, for calibration capture.
#[derive(Debug, Clone)]
pub struct LandmarkSet {
    points: Vec<Point>,
}

impl LandmarkSet {
    /// Wrap a detector output.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Landmark at `index`, if present.
    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Number of landmarks in the set.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ── ExpressionScores ────────────────────────────────────────

/// Optional per-category expression intensities from the detector
/// (blendshape scores), keyed by stable category name.
#[derive(Debug, Clone, Default)]
pub struct ExpressionScores {
    categories: Vec<(String, f64)>,
}

impl ExpressionScores {
    /// No expression data available.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from (category name, score) pairs.
    pub fn from_pairs(pairs: Vec<(String, f64)>) -> Self {
        Self { categories: pairs }
    }

    /// Score for a category; 0.0 when the category is absent.
    pub fn score(&self, category: &str) -> f64 {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, score)| *score)
            .unwrap_or(0.0)
    }
}

// ── Frame ───────────────────────────────────────────────────

/// One detected frame: landmarks plus whatever expression scores the
/// detector produced alongside them.
#[derive(Debug, Clone)]
pub struct Frame {
    pub landmarks: LandmarkSet,
    pub expressions: ExpressionScores,
}

impl Frame {
    pub fn new(landmarks: LandmarkSet, expressions: ExpressionScores) -> Self {
        Self {
            landmarks,
            expressions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_out_of_range() {
        let set = LandmarkSet::new(vec![Point::new(0.1, 0.2)]);
        assert_eq!(set.get(0), Some(Point::new(0.1, 0.2)));
        assert_eq!(set.get(1), None);
        assert_eq!(set.get(IRIS_CENTER), None);
    }

    #[test]
    fn test_expression_score_lookup() {
        let scores = ExpressionScores::from_pairs(vec![
            ("eyeBlinkLeft".to_string(), 0.1),
            (LOOK_DOWN_LEFT.to_string(), 0.7),
        ]);
        assert!((scores.score(LOOK_DOWN_LEFT) - 0.7).abs() < f64::EPSILON);
        assert!((scores.score("eyeBlinkLeft") - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_expression_score_missing_is_zero() {
        let scores = ExpressionScores::none();
        assert_eq!(scores.score(LOOK_DOWN_LEFT), 0.0);
    }
}
