use serde::{Deserialize, Serialize};

use super::MovingAverageSeries;
use crate::{Series, TradingDate};

/// One chart sample, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: TradingDate,
    pub close: f64,
    pub moving_average: Option<f64>,
}

/// Pairs the series, re-ordered oldest first, with a moving average computed
/// over the same series.
///
/// Average `k` lands on chronological position `m - 1 - k` counted from the
/// end, i.e. oldest-first index `len - m + k`, so the last average sits on the
/// most recent bar. Earlier points carry no average.
pub fn chart_points(series: &Series, moving_average: &MovingAverageSeries) -> Vec<ChartPoint> {
    let len = series.len();
    let filled = moving_average.len().min(len);
    let offset = len - filled;

    series
        .chronological()
        .enumerate()
        .map(|(index, bar)| ChartPoint {
            date: bar.date,
            close: bar.close,
            moving_average: index
                .checked_sub(offset)
                .and_then(|k| moving_average.values.get(k).copied()),
        })
        .collect()
}
