//! Price-series analytics.
//!
//! Every function here is a pure transform of a newest-first [`Series`]:
//!
//! | Function | Output | Absent when |
//! |----------|--------|-------------|
//! | [`compute_trend`] | [`TrendResult`] | fewer than 2 bars |
//! | [`compute_moving_average`] | [`MovingAverageSeries`] | fewer than 2 bars, or window > len |
//! | [`compute_volatility`] | [`VolatilityResult`] | fewer than 2 bars |
//! | [`chart_points`] | oldest-first [`ChartPoint`]s | never |
//!
//! Absent statistics are a valid state and render as `"N/A"`.

mod chart;
mod moving_average;
mod trend;
mod volatility;

use serde::{Deserialize, Serialize};

use crate::Series;

pub use chart::{chart_points, ChartPoint};
pub use moving_average::{compute_moving_average, MovingAverageSeries, DEFAULT_WINDOW};
pub use trend::{compute_trend, TrendDirection, TrendResult};
pub use volatility::{compute_volatility, VolatilityResult};

pub const NOT_AVAILABLE: &str = "N/A";

/// The three statistics derived from one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub trend: Option<TrendResult>,
    pub moving_average: MovingAverageSeries,
    pub volatility: Option<VolatilityResult>,
}

impl AnalyticsSummary {
    pub fn display(&self) -> SummaryDisplay {
        SummaryDisplay {
            trend: display_or_na(self.trend.as_ref()),
            moving_average: self
                .moving_average
                .latest()
                .map(|value| format!("{value:.2}"))
                .unwrap_or_else(|| NOT_AVAILABLE.to_owned()),
            volatility: display_or_na(self.volatility.as_ref()),
        }
    }
}

/// Display strings for an [`AnalyticsSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryDisplay {
    pub trend: String,
    pub moving_average: String,
    pub volatility: String,
}

pub fn summarize(series: &Series, window: usize) -> AnalyticsSummary {
    AnalyticsSummary {
        trend: compute_trend(series),
        moving_average: compute_moving_average(series, window),
        volatility: compute_volatility(series),
    }
}

fn display_or_na<T: std::fmt::Display>(value: Option<&T>) -> String {
    value
        .map(ToString::to_string)
        .unwrap_or_else(|| NOT_AVAILABLE.to_owned())
}

/// Rounds to two decimal places.
pub(crate) fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use time::Duration;

    use crate::{PriceBar, Series, Symbol, TradingDate};

    /// Series with one flat bar per close, newest first, on consecutive days.
    pub fn series_from_closes(closes: &[f64]) -> Series {
        let newest = TradingDate::parse("2024-06-28").expect("date").into_inner();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(offset, close)| {
                let date = TradingDate::new(newest - Duration::days(offset as i64));
                PriceBar::flat(date, *close, 1_000).expect("valid bar")
            })
            .collect();
        Series::new(Symbol::parse("TEST").expect("symbol"), bars).expect("valid series")
    }
}
