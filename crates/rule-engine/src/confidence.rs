//! Confidence arithmetic

/// Upper bound of any confidence
pub const MAX_CONFIDENCE: f64 = 1.0;
/// Lower bound of any confidence
pub const MIN_CONFIDENCE: f64 = 0.0;

/// Clamp into [0, 1]; NaN collapses to 0
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        MIN_CONFIDENCE
    } else {
        value.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
    }
}

/// Merge two independent pieces of evidence for the same conclusion.
///
/// Probabilistic OR: `c1 + c2 - c1*c2`, clamped to [0, 1].
pub fn combine(c1: f64, c2: f64) -> f64 {
    clamp_confidence(c1 + c2 - c1 * c2)
}
