use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::round_to_cents;
use crate::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
}

impl TrendDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Direction and percentage change from the oldest to the newest close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub direction: TrendDirection,
    pub percentage_change: f64,
}

impl Display for TrendResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let arrow = match self.direction {
            TrendDirection::Up => "▲",
            TrendDirection::Down => "▼",
        };
        write!(f, "{arrow} {:+.2}%", self.percentage_change)
    }
}

/// Trend over the whole series. `None` for a single bar.
///
/// Equal endpoints classify as [`TrendDirection::Down`].
pub fn compute_trend(series: &Series) -> Option<TrendResult> {
    if series.len() < 2 {
        return None;
    }

    let latest = series.latest().close;
    let earliest = series.earliest().close;
    let direction = if latest > earliest {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    Some(TrendResult {
        direction,
        percentage_change: round_to_cents((latest - earliest) / earliest * 100.0),
    })
}
