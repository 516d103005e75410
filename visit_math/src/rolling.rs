//! Lookups over a chronologically ordered value buffer
//!
//! Both helpers only ever read the tail of the buffer. The value being
//! predicted is never part of the buffer yet, so a trailing mean here is the
//! "shift by one" rolling mean of a training table.

use crate::{MathError, Result};

/// Value `k` steps before the end of the buffer (`k = 1` is the last value)
pub fn lag(values: &[f64], k: usize) -> Result<f64> {
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Lag must be greater than zero".to_string(),
        ));
    }

    if values.len() < k {
        return Err(MathError::InsufficientData(format!(
            "Not enough data for lag {}. Need {} values, have {}.",
            k,
            k,
            values.len()
        )));
    }

    Ok(values[values.len() - k])
}

/// Mean of the last `window` values of the buffer
pub fn trailing_mean(values: &[f64], window: usize) -> Result<f64> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Window must be greater than zero".to_string(),
        ));
    }

    if values.len() < window {
        return Err(MathError::InsufficientData(format!(
            "Not enough data for a {}-value mean. Have {}.",
            window,
            values.len()
        )));
    }

    let tail = &values[values.len() - window..];
    Ok(tail.iter().sum::<f64>() / window as f64)
}
