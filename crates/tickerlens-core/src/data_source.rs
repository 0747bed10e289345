//! Data source trait and request/response types.
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | Daily series | [`DailySeriesRequest`] | [`Series`] (newest first) |
//! | Search | [`SearchRequest`] | [`SearchBatch`] |
//!
//! Failures are reported as a single [`SourceError`]. Nothing in this layer
//! retries; the caller shows the message and the user tries again.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{Instrument, ProviderId, Series, Symbol};

/// Largest series the upstream returns in compact mode.
pub const MAX_DAILY_BARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    DailySeries,
    Search,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DailySeries => "daily_series",
            Self::Search => "search",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    MissingCredentials,
    InvalidRequest,
    RateLimited,
    Unavailable,
    NoData,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::MissingCredentials, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::InvalidRequest, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::RateLimited, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Unavailable, message)
    }

    pub fn no_data(symbol: &Symbol) -> Self {
        Self::new(
            SourceErrorKind::NoData,
            format!("no daily prices available for '{symbol}'"),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Internal, message)
    }

    fn new(kind: SourceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::MissingCredentials => "source.missing_credentials",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::NoData => "source.no_data",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request for the most recent daily bars of one symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySeriesRequest {
    pub symbol: Symbol,
    pub limit: usize,
}

impl DailySeriesRequest {
    pub fn new(symbol: Symbol, limit: usize) -> Result<Self, SourceError> {
        if limit == 0 || limit > MAX_DAILY_BARS {
            return Err(SourceError::invalid_request(format!(
                "daily series limit must be between 1 and {MAX_DAILY_BARS}, got {limit}"
            )));
        }
        Ok(Self { symbol, limit })
    }

    pub fn compact(symbol: Symbol) -> Self {
        Self {
            symbol,
            limit: MAX_DAILY_BARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub limit: usize,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, limit: usize) -> Result<Self, SourceError> {
        let query = query.into().trim().to_owned();
        if query.is_empty() {
            return Err(SourceError::invalid_request(
                "search query must not be empty",
            ));
        }
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "search limit must be greater than zero",
            ));
        }
        Ok(Self { query, limit })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBatch {
    pub query: String,
    pub results: Vec<Instrument>,
}

/// Market-data provider contract.
pub trait DataSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn daily_series<'a>(
        &'a self,
        req: DailySeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>>;

    fn search<'a>(
        &'a self,
        req: SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchBatch, SourceError>> + Send + 'a>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_request_limit_is_bounded() {
        let symbol = Symbol::parse("IBM").expect("valid");
        assert!(DailySeriesRequest::new(symbol.clone(), 0).is_err());
        assert!(DailySeriesRequest::new(symbol.clone(), 101).is_err());
        assert_eq!(
            DailySeriesRequest::new(symbol.clone(), 100).expect("valid"),
            DailySeriesRequest::compact(symbol)
        );
    }

    #[test]
    fn search_request_trims_query() {
        let request = SearchRequest::new("  tesla ", 5).expect("valid");
        assert_eq!(request.query, "tesla");

        let error = SearchRequest::new("   ", 5).expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    }

    #[test]
    fn no_data_error_names_symbol() {
        let error = SourceError::no_data(&Symbol::parse("ZZZZ").expect("valid"));
        assert_eq!(error.code(), "source.no_data");
        assert_eq!(
            error.to_string(),
            "no daily prices available for 'ZZZZ' (source.no_data)"
        );
    }
}
