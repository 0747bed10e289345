use serde::{Deserialize, Serialize};

use crate::{PriceBar, Symbol, ValidationError};

/// Daily bars for one symbol, newest first.
///
/// Index 0 is the most recent session. A series is never empty and its dates
/// are strictly decreasing; both are checked on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSeries")]
pub struct Series {
    symbol: Symbol,
    bars: Vec<PriceBar>,
}

#[derive(Deserialize)]
struct RawSeries {
    symbol: Symbol,
    bars: Vec<PriceBar>,
}

impl TryFrom<RawSeries> for Series {
    type Error = ValidationError;

    fn try_from(raw: RawSeries) -> Result<Self, Self::Error> {
        Self::new(raw.symbol, raw.bars)
    }
}

impl Series {
    /// Builds a series from bars already ordered newest first.
    pub fn new(symbol: Symbol, bars: Vec<PriceBar>) -> Result<Self, ValidationError> {
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date <= pair[1].date) {
            return Err(ValidationError::SeriesNotNewestFirst {
                newer: pair[0].date.to_string(),
                older: pair[1].date.to_string(),
            });
        }

        Ok(Self { symbol, bars })
    }

    /// Builds a series from bars ordered oldest first.
    pub fn from_chronological(
        symbol: Symbol,
        mut bars: Vec<PriceBar>,
    ) -> Result<Self, ValidationError> {
        bars.reverse();
        Self::new(symbol, bars)
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Bars, newest first.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// `true` when the series holds no bars, which construction rules out.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> &PriceBar {
        &self.bars[0]
    }

    pub fn earliest(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    /// Closing prices, newest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    /// Bars, oldest first.
    pub fn chronological(&self) -> impl DoubleEndedIterator<Item = &PriceBar> + ExactSizeIterator {
        self.bars.iter().rev()
    }

    pub fn into_bars(self) -> Vec<PriceBar> {
        self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TradingDate;

    fn bar(date: &str, close: f64) -> PriceBar {
        PriceBar::flat(TradingDate::parse(date).expect("date"), close, 100).expect("bar")
    }

    fn symbol() -> Symbol {
        Symbol::parse("IBM").expect("symbol")
    }

    #[test]
    fn rejects_empty_series() {
        let err = Series::new(symbol(), Vec::new()).expect_err("must fail");
        assert_eq!(err, ValidationError::EmptySeries);
    }

    #[test]
    fn rejects_oldest_first_input() {
        let err = Series::new(
            symbol(),
            vec![bar("2024-01-02", 10.0), bar("2024-01-03", 11.0)],
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::SeriesNotNewestFirst { .. }));
    }

    #[test]
    fn chronological_constructor_reverses() {
        let series = Series::from_chronological(
            symbol(),
            vec![bar("2024-01-02", 10.0), bar("2024-01-03", 11.0)],
        )
        .expect("valid series");

        assert_eq!(series.latest().close, 11.0);
        assert_eq!(series.earliest().close, 10.0);
        assert_eq!(series.closes(), vec![11.0, 10.0]);
        let oldest_first = series.chronological().map(|bar| bar.close).collect::<Vec<_>>();
        assert_eq!(oldest_first, vec![10.0, 11.0]);
    }

    #[test]
    fn deserialization_enforces_ordering() {
        let payload = r#"{"symbol":"IBM","bars":[
            {"date":"2024-01-02","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1},
            {"date":"2024-01-03","open":1.0,"high":1.0,"low":1.0,"close":1.0,"volume":1}
        ]}"#;
        assert!(serde_json::from_str::<Series>(payload).is_err());
    }
}
