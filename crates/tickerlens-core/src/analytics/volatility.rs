use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::round_to_cents;
use crate::Series;

/// Standard deviation of day-over-day returns, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityResult {
    pub percent: f64,
}

impl Display for VolatilityResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.percent)
    }
}

/// Population standard deviation of adjacent-bar returns. `None` for a single bar.
///
/// Each return is taken relative to the older bar of the pair:
/// `(close[i] - close[i + 1]) / close[i + 1]`.
pub fn compute_volatility(series: &Series) -> Option<VolatilityResult> {
    if series.len() < 2 {
        return None;
    }

    let closes = series.closes();
    let returns = closes
        .windows(2)
        .map(|pair| (pair[0] - pair[1]) / pair[1])
        .collect::<Vec<_>>();

    let count = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / count;
    let variance = returns
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>()
        / count;

    Some(VolatilityResult {
        percent: round_to_cents(variance.sqrt() * 100.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::series_from_closes;

    #[test]
    fn single_return_has_zero_volatility() {
        let volatility = compute_volatility(&series_from_closes(&[102.0, 100.0])).expect("value");
        assert_eq!(volatility.percent, 0.0);
    }

    #[test]
    fn uses_population_variance() {
        // returns: -10/110 and +10/100; population sd = 9.5454...
        let volatility =
            compute_volatility(&series_from_closes(&[100.0, 110.0, 100.0])).expect("value");
        assert_eq!(volatility.percent, 9.55);
        assert_eq!(volatility.to_string(), "9.55%");
    }

    #[test]
    fn single_bar_has_no_volatility() {
        assert!(compute_volatility(&series_from_closes(&[100.0])).is_none());
    }
}
