use serde::{Deserialize, Serialize};

use crate::Series;

pub const DEFAULT_WINDOW: usize = 7;

/// Simple moving average of closes, in newest-first order.
///
/// Value `k` is the mean of the closes at newest-first indices
/// `k ..= k + window - 1`. Indices before the window fills produce no value,
/// so `values.len() == len - window + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSeries {
    pub window: usize,
    pub values: Vec<f64>,
}

impl MovingAverageSeries {
    pub fn empty(window: usize) -> Self {
        Self {
            window,
            values: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Most recent average.
    pub fn latest(&self) -> Option<f64> {
        self.values.first().copied()
    }
}

/// Trailing simple moving average over the newest-first closes.
///
/// Empty for a single bar, a zero window, or a window longer than the series.
pub fn compute_moving_average(series: &Series, window: usize) -> MovingAverageSeries {
    if series.len() < 2 || window == 0 || window > series.len() {
        return MovingAverageSeries::empty(window);
    }

    let closes = series.closes();
    let values = (window - 1..closes.len())
        .map(|index| {
            let slice = &closes[index + 1 - window..=index];
            slice.iter().sum::<f64>() / window as f64
        })
        .collect();

    MovingAverageSeries { window, values }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::series_from_closes;

    #[test]
    fn ten_bars_with_window_seven_yield_four_values() {
        let closes = [10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let average = compute_moving_average(&series_from_closes(&closes), DEFAULT_WINDOW);

        assert_eq!(average.len(), 4);
        assert_eq!(average.values, vec![7.0, 6.0, 5.0, 4.0]);
        assert_eq!(average.latest(), Some(7.0));
    }

    #[test]
    fn window_longer_than_series_is_empty() {
        let average = compute_moving_average(&series_from_closes(&[3.0, 2.0, 1.0]), 7);
        assert!(average.is_empty());
        assert_eq!(average.window, 7);
    }

    #[test]
    fn single_bar_and_zero_window_are_empty() {
        assert!(compute_moving_average(&series_from_closes(&[3.0]), 1).is_empty());
        assert!(compute_moving_average(&series_from_closes(&[3.0, 2.0]), 0).is_empty());
    }
}
