//! Month arithmetic and meteorological seasons

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Meteorological season of a calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// December, January, February
    Winter,
    /// March, April, May
    Spring,
    /// June, July, August
    Summer,
    /// September, October, November
    Fall,
}

impl Season {
    /// All seasons in calendar order, starting with winter
    pub const ALL: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Season for a month number in `1..=12`
    pub fn from_month(month: u32) -> Result<Self> {
        match month {
            12 | 1 | 2 => Ok(Season::Winter),
            3..=5 => Ok(Season::Spring),
            6..=8 => Ok(Season::Summer),
            9..=11 => Ok(Season::Fall),
            _ => Err(MathError::InvalidInput(format!(
                "Month must be between 1 and 12, got {}",
                month
            ))),
        }
    }

    /// Lowercase label used in tabular artifacts
    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Winter => "winter",
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Fall => "fall",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar month following `(year, month)`, rolling December into January
pub fn next_month(year: i32, month: u32) -> Result<(i32, u32)> {
    match month {
        12 => year.checked_add(1).map(|next| (next, 1)).ok_or_else(|| {
            MathError::InvalidInput(format!("Year {} has no successor", year))
        }),
        1..=11 => Ok((year, month + 1)),
        _ => Err(MathError::InvalidInput(format!(
            "Month must be between 1 and 12, got {}",
            month
        ))),
    }
}
