//! Normalization primitives mapping raw metrics onto [0, 1]

use crate::config::NEUTRAL_SCORE;

/// Higher values are healthier; saturates at `cap`.
///
/// Returns 0.0 when `cap` is not positive.
pub fn normalise_higher(value: f64, cap: f64) -> f64 {
    if cap > 0.0 {
        (value / cap).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Lower values are healthier; 1.0 at zero, floors at 0.0 from `cap` on.
///
/// Returns 1.0 when `cap` is not positive.
pub fn normalise_lower(value: f64, cap: f64) -> f64 {
    if cap > 0.0 {
        (1.0 - value / cap).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Score a ratio-shaped component only when there is something to measure.
///
/// No data is not bad data: a zero `count` yields [`NEUTRAL_SCORE`] and
/// `score_fn` is never called.
pub fn handle_zero<F>(count: u64, score_fn: F) -> f64
where
    F: FnOnce() -> f64,
{
    if count == 0 {
        NEUTRAL_SCORE
    } else {
        score_fn()
    }
}

/// Clamp an upstream rate into [0, 1]
pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// `1 - rate`, for rates where less is better
pub fn inverse_rate(rate: f64) -> f64 {
    1.0 - clamp_rate(rate)
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(components: &[f64]) -> f64 {
    if components.is_empty() {
        return 0.0;
    }
    components.iter().sum::<f64>() / components.len() as f64
}
