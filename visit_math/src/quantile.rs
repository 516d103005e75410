//! Empirical quantiles

use crate::{MathError, Result};

/// Quantile of `values` using linear interpolation between closest ranks.
///
/// The position of quantile `q` in the sorted sample is `q * (n - 1)`; when it
/// falls between two ranks the result is interpolated between them. NaN and
/// infinite entries are ignored.
pub fn quantile(values: &[f64], q: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be between 0 and 1, got {}",
            q
        )));
    }

    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(MathError::InsufficientData(
            "No finite values to compute a quantile from".to_string(),
        ));
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    Ok(interpolate_sorted(&sorted, q))
}

fn interpolate_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let index = q * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper || upper >= sorted.len() {
        sorted[lower]
    } else {
        let fraction = index - lower as f64;
        sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
    }
}
