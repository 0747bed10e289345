//! Fetch-then-analyze orchestration behind the `analyze` command.
//!
//! Each [`Dashboard::load`] call returns a fresh [`DashboardView`]; nothing is
//! shared between loads.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analytics::{
    chart_points, summarize, AnalyticsSummary, ChartPoint, SummaryDisplay, DEFAULT_WINDOW,
};
use crate::data_source::{DailySeriesRequest, DataSource, SourceError, MAX_DAILY_BARS};
use crate::{PriceBar, ProviderId, Series, Symbol};

/// Everything the dashboard shows for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub symbol: Symbol,
    pub latest: PriceBar,
    pub bar_count: usize,
    pub window: usize,
    pub chart: Vec<ChartPoint>,
    pub summary: AnalyticsSummary,
    pub display: SummaryDisplay,
    pub latency_ms: u64,
}

/// Runs the analytics pipeline over an already-fetched series.
pub fn build_view(series: &Series, window: usize) -> DashboardView {
    let summary = summarize(series, window);
    let chart = chart_points(series, &summary.moving_average);

    DashboardView {
        symbol: series.symbol().clone(),
        latest: series.latest().clone(),
        bar_count: series.len(),
        window,
        chart,
        display: summary.display(),
        summary,
        latency_ms: 0,
    }
}

#[derive(Clone)]
pub struct Dashboard {
    source: Arc<dyn DataSource>,
    window: usize,
    limit: usize,
}

impl Dashboard {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            window: DEFAULT_WINDOW,
            limit: MAX_DAILY_BARS,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn source_id(&self) -> ProviderId {
        self.source.id()
    }

    pub async fn load(&self, symbol: &Symbol) -> Result<DashboardView, SourceError> {
        let started = Instant::now();
        let request = DailySeriesRequest::new(symbol.clone(), self.limit)?;

        let series = self
            .source
            .daily_series(request)
            .await
            .inspect_err(|error| warn!(%symbol, %error, "daily series fetch failed"))?;

        let mut view = build_view(&series, self.window);
        view.latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            %symbol,
            bars = view.bar_count,
            window = self.window,
            latency_ms = view.latency_ms,
            "dashboard loaded"
        );
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::series_from_closes;
    use crate::analytics::TrendDirection;

    #[test]
    fn view_pairs_chart_with_summary() {
        let series = series_from_closes(&[110.0, 108.0, 104.0, 100.0]);
        let view = build_view(&series, 2);

        assert_eq!(view.bar_count, 4);
        assert_eq!(view.latest.close, 110.0);
        assert_eq!(view.chart.len(), 4);
        assert_eq!(view.chart[0].close, 100.0);
        assert!(view.chart[0].moving_average.is_none());
        assert_eq!(
            view.summary.trend.as_ref().map(|trend| trend.direction),
            Some(TrendDirection::Up)
        );
        assert_eq!(view.display.moving_average, "109.00");
    }

    #[test]
    fn single_bar_view_has_no_statistics() {
        let view = build_view(&series_from_closes(&[50.0]), DEFAULT_WINDOW);

        assert_eq!(view.bar_count, 1);
        assert!(view.summary.trend.is_none());
        assert!(view.summary.moving_average.is_empty());
        assert!(view.summary.volatility.is_none());
        assert_eq!(view.display.volatility, "N/A");
    }
}
