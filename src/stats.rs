//! Statistical primitives shared by the block estimators.
//!
//! All spreads are *population* standard deviations (normalized by N, not
//! N-1): a 3x3 block is the whole population of interest, not a sample
//! from a larger one.

/// Replacement value for aberrant relative standard deviations.
pub const REL_STD_CLAMP: f64 = 0.5;

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn population_std(values: &[f64]) -> f64 {
    let m = mean(values);
    let var = values.iter().map(|&v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Relative standard deviation `std / mean`.
///
/// A zero mean yields a non-finite ratio; callers that need a bounded
/// value apply [`clamp_relative_std`].
pub fn relative_std(values: &[f64]) -> f64 {
    population_std(values) / mean(values)
}

/// Clamp a relative standard deviation into its trusted domain.
///
/// Anything outside the open interval (0, 1) is aberrant for an I/F block
/// (negative means a negative-mean artifact, ≥1 means the spread swamps
/// the signal, NaN/±inf come from a zero mean) and is replaced by
/// [`REL_STD_CLAMP`]. NaN fails both comparisons, so it lands on the
/// replacement too.
pub fn clamp_relative_std(rel: f64) -> f64 {
    if rel > 0.0 && rel < 1.0 {
        rel
    } else {
        REL_STD_CLAMP
    }
}
