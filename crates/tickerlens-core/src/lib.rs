//! Core library for tickerlens.
//!
//! This crate contains:
//! - Validated domain models (symbols, trading dates, price bars, series)
//! - The analytics pipeline: trend, moving average, volatility, chart pairing
//! - The data source trait and the Alpha Vantage adapter
//! - Key-value stores and the cached symbol directory
//! - Dashboard orchestration, configuration and the response envelope

pub mod adapters;
pub mod analytics;
pub mod config;
pub mod dashboard;
pub mod data_source;
pub mod directory;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod provider_policy;
pub mod source;
pub mod store;
pub mod throttling;

pub use adapters::AlphaVantageAdapter;
pub use analytics::{
    chart_points, compute_moving_average, compute_trend, compute_volatility, summarize,
    AnalyticsSummary, ChartPoint, MovingAverageSeries, SummaryDisplay, TrendDirection, TrendResult,
    VolatilityResult, DEFAULT_WINDOW, NOT_AVAILABLE,
};
pub use config::{Config, ConfigError};
pub use dashboard::{build_view, Dashboard, DashboardView};
pub use data_source::{
    DailySeriesRequest, DataSource, Endpoint, SearchBatch, SearchRequest, SourceError,
    SourceErrorKind, MAX_DAILY_BARS,
};
pub use directory::{DirectoryError, DirectorySearch, SymbolDirectory};
pub use domain::{AssetClass, Instrument, PriceBar, Series, Symbol, TradingDate};
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta, SCHEMA_VERSION};
pub use error::{CoreError, ValidationError};
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use provider_policy::ProviderPolicy;
pub use source::ProviderId;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use throttling::QuotaGate;
