// src/processing/scoring.rs
//! Shared range-based confidence scoring.

/// Score a value against a physiologically-normal interval `[min, max]`.
///
/// Inside the interval the score is 1. Outside, it decays linearly with the
/// relative overshoot past the nearer bound: below `min` the score is
/// `1 - (min - value) / min`, above `max` it is `1 - (value - max) / max`.
/// The result is clamped to [0, 1], so degenerate bounds (zero or negative,
/// where the relative overshoot changes sign) cannot push a score past 1.
pub fn range_score(value: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if value >= min && value <= max {
        1.0
    } else if value < min {
        (1.0 - (min - value) / min).clamp(0.0, 1.0)
    } else {
        (1.0 - (value - max) / max).clamp(0.0, 1.0)
    }
}
