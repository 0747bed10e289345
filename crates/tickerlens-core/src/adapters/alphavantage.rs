use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::data_source::{
    DailySeriesRequest, DataSource, Endpoint, SearchBatch, SearchRequest, SourceError,
};
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::QuotaGate;
use crate::{
    AssetClass, Instrument, PriceBar, ProviderId, Series, Symbol, TradingDate, ValidationError,
};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Alpha Vantage adapter.
///
/// With a real transport it calls `TIME_SERIES_DAILY` and `SYMBOL_SEARCH`.
/// With an offline transport ([`NoopHttpClient`]) it synthesizes a
/// deterministic series per symbol and searches a small built-in catalog.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: Option<String>,
    policy: ProviderPolicy,
    quota: QuotaGate,
    use_real_api: bool,
}

impl Default for AlphaVantageAdapter {
    fn default() -> Self {
        let policy = ProviderPolicy::alphavantage_default();
        Self {
            http_client: Arc::new(NoopHttpClient),
            api_key: None,
            quota: QuotaGate::from_policy(&policy),
            policy,
            use_real_api: false,
        }
    }
}

impl AlphaVantageAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        let use_real_api = !http_client.is_mock();
        Self {
            http_client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            use_real_api,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: ProviderPolicy) -> Self {
        self.quota = QuotaGate::from_policy(&policy);
        self.policy = policy;
        self
    }

    pub fn is_offline(&self) -> bool {
        !self.use_real_api
    }

    fn acquire_quota(&self) -> Result<(), SourceError> {
        self.quota.try_acquire().map_err(|wait| {
            SourceError::rate_limited(format!(
                "alphavantage free-tier limit exceeded; retry in {:.0}s",
                wait.as_secs_f64().ceil()
            ))
        })
    }

    fn api_key(&self) -> Result<&str, SourceError> {
        self.api_key.as_deref().ok_or_else(|| {
            SourceError::missing_credentials(
                "alphavantage API key is not configured; set TICKERLENS_ALPHAVANTAGE_API_KEY",
            )
        })
    }

    async fn call(
        &self,
        endpoint: Endpoint,
        params: &[(&str, &str)],
    ) -> Result<String, SourceError> {
        let api_key = self.api_key()?;
        self.acquire_quota()?;

        let mut request = HttpRequest::get(BASE_URL)
            .with_query("function", upstream_function(endpoint))
            .with_timeout_ms(self.policy.request_timeout_ms());
        for (name, value) in params {
            request = request.with_query(*name, *value);
        }
        let request = request.with_query("apikey", api_key);

        debug!(%endpoint, url = %request.redacted_url(), "calling alphavantage");
        let response = self.http_client.execute(request).await.map_err(|error| {
            SourceError::unavailable(format!(
                "alphavantage transport error: {}",
                error.message()
            ))
        })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "alphavantage returned status {}",
                response.status
            )));
        }

        Ok(response.body)
    }
}

// Real API
impl AlphaVantageAdapter {
    async fn fetch_real_series(&self, req: &DailySeriesRequest) -> Result<Series, SourceError> {
        let body = self
            .call(
                Endpoint::DailySeries,
                &[("symbol", req.symbol.as_str()), ("outputsize", "compact")],
            )
            .await?;

        parse_daily_series(&req.symbol, &body, req.limit)
    }

    async fn execute_real_search(&self, req: &SearchRequest) -> Result<SearchBatch, SourceError> {
        let body = self
            .call(Endpoint::Search, &[("keywords", req.query.as_str())])
            .await?;

        parse_search(req, &body)
    }
}

const fn upstream_function(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::DailySeries => "TIME_SERIES_DAILY",
        Endpoint::Search => "SYMBOL_SEARCH",
    }
}

// Offline data
impl AlphaVantageAdapter {
    fn synthesize_series(&self, req: &DailySeriesRequest) -> Result<Series, SourceError> {
        self.acquire_quota()?;

        let seed = symbol_seed(&req.symbol);
        let mut date = TradingDate::new(OffsetDateTime::now_utc().date());
        let mut bars = Vec::with_capacity(req.limit);

        for index in 0..req.limit {
            date = date.previous_weekday();
            let step = index as u64;
            let drift = (seed.wrapping_add(step * 7) % 90) as f64 / 10.0;
            let close = 80.0 + (seed % 400) as f64 / 10.0 + drift;
            let open = close - 0.45 + (seed.wrapping_add(step) % 9) as f64 / 10.0;
            let high = open.max(close) + 0.85;
            let low = open.min(close) - 0.60;
            let volume = 1_200_000 + (seed % 50_000) + step * 1_500;

            bars.push(
                PriceBar::new(date, open, high, low, close, volume).map_err(validation_to_error)?,
            );
        }

        Series::new(req.symbol.clone(), bars).map_err(validation_to_error)
    }

    fn search_catalog(&self, req: &SearchRequest) -> Result<SearchBatch, SourceError> {
        self.acquire_quota()?;

        let results = offline_catalog()
            .into_iter()
            .filter(|instrument| {
                instrument.symbol.starts_with_ignore_case(&req.query)
                    || instrument.name_contains(&req.query)
            })
            .take(req.limit)
            .collect();

        Ok(SearchBatch {
            query: req.query.clone(),
            results,
        })
    }
}

impl DataSource for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn daily_series<'a>(
        &'a self,
        req: DailySeriesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<Series, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.fetch_real_series(&req).await
            } else {
                self.synthesize_series(&req)
            }
        })
    }

    fn search<'a>(
        &'a self,
        req: SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if self.use_real_api {
                self.execute_real_search(&req).await
            } else {
                self.search_catalog(&req)
            }
        })
    }
}

#[derive(Debug, Deserialize)]
struct DailySeriesPayload {
    #[serde(rename = "Time Series (Daily)", default)]
    time_series: Option<BTreeMap<String, DailyBarPayload>>,
    #[serde(flatten)]
    notice: UpstreamNotice,
}

#[derive(Debug, Deserialize)]
struct DailyBarPayload {
    #[serde(rename = "1. open")]
    open: String,
    #[serde(rename = "2. high")]
    high: String,
    #[serde(rename = "3. low")]
    low: String,
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume", default)]
    volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    #[serde(rename = "bestMatches", default)]
    best_matches: Vec<SearchMatchPayload>,
    #[serde(flatten)]
    notice: UpstreamNotice,
}

#[derive(Debug, Deserialize)]
struct SearchMatchPayload {
    #[serde(rename = "1. symbol")]
    symbol: String,
    #[serde(rename = "2. name")]
    name: String,
    #[serde(rename = "3. type", default)]
    match_type: String,
    #[serde(rename = "4. region", default)]
    region: Option<String>,
    #[serde(rename = "8. currency", default)]
    currency: Option<String>,
}

/// Messages Alpha Vantage returns with a 200 status instead of data.
#[derive(Debug, Default, Deserialize)]
struct UpstreamNotice {
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

impl UpstreamNotice {
    fn into_result(self) -> Result<(), SourceError> {
        if let Some(message) = self.error_message {
            return Err(SourceError::invalid_request(format!(
                "alphavantage rejected the request: {message}"
            )));
        }
        // "Note" and "Information" both carry quota messages.
        if let Some(message) = self.note.or(self.information) {
            return Err(SourceError::rate_limited(format!(
                "alphavantage quota message: {message}"
            )));
        }
        Ok(())
    }
}

pub(crate) fn parse_daily_series(
    symbol: &Symbol,
    body: &str,
    limit: usize,
) -> Result<Series, SourceError> {
    let payload: DailySeriesPayload = serde_json::from_str(body).map_err(|e| {
        SourceError::internal(format!("failed to parse alphavantage daily series: {e}"))
    })?;
    payload.notice.into_result()?;

    let time_series = payload.time_series.unwrap_or_default();
    let mut bars = Vec::with_capacity(limit.min(time_series.len()));

    // Keys are ISO dates, so reverse map order is newest first.
    for (date, raw) in time_series.iter().rev() {
        if bars.len() == limit {
            break;
        }
        match normalize_bar(date, raw) {
            Ok(bar) => bars.push(bar),
            Err(error) => warn!(%symbol, %date, %error, "skipping malformed daily bar"),
        }
    }

    if bars.is_empty() {
        return Err(SourceError::no_data(symbol));
    }

    Series::new(symbol.clone(), bars).map_err(validation_to_error)
}

pub(crate) fn parse_search(req: &SearchRequest, body: &str) -> Result<SearchBatch, SourceError> {
    let payload: SearchPayload = serde_json::from_str(body).map_err(|e| {
        SourceError::internal(format!("failed to parse alphavantage search response: {e}"))
    })?;
    payload.notice.into_result()?;

    let results = payload
        .best_matches
        .into_iter()
        .filter_map(|raw| {
            let symbol = Symbol::parse(&raw.symbol).ok()?;
            let mut instrument =
                Instrument::new(symbol, raw.name, AssetClass::from_match_type(&raw.match_type));
            if let Some(region) = raw.region {
                instrument = instrument.with_region(region);
            }
            if let Some(currency) = raw.currency {
                instrument = instrument.with_currency(&currency);
            }
            Some(instrument)
        })
        .take(req.limit)
        .collect();

    Ok(SearchBatch {
        query: req.query.clone(),
        results,
    })
}

#[derive(Debug, thiserror::Error)]
enum BarParseError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("field '{field}' is not a number: '{value}'")]
    NotANumber { field: &'static str, value: String },
}

fn normalize_bar(date: &str, raw: &DailyBarPayload) -> Result<PriceBar, BarParseError> {
    let volume = match raw.volume.as_deref() {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| BarParseError::NotANumber {
                field: "volume",
                value: value.to_owned(),
            })?,
        None => 0,
    };

    Ok(PriceBar::new(
        TradingDate::parse(date)?,
        parse_price("open", &raw.open)?,
        parse_price("high", &raw.high)?,
        parse_price("low", &raw.low)?,
        parse_price("close", &raw.close)?,
        volume,
    )?)
}

fn parse_price(field: &'static str, value: &str) -> Result<f64, BarParseError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| BarParseError::NotANumber {
            field,
            value: value.to_owned(),
        })
}

fn offline_catalog() -> Vec<Instrument> {
    [
        ("AAPL", "Apple Inc", AssetClass::Equity),
        ("IBM", "International Business Machines Corp", AssetClass::Equity),
        ("MSFT", "Microsoft Corporation", AssetClass::Equity),
        ("TSLA", "Tesla Inc", AssetClass::Equity),
        ("TSCO.LON", "Tesco PLC", AssetClass::Equity),
        ("SPY", "SPDR S&P 500 ETF Trust", AssetClass::Etf),
        ("VFIAX", "Vanguard 500 Index Fund Admiral Shares", AssetClass::MutualFund),
    ]
    .into_iter()
    .filter_map(|(symbol, name, asset_class)| {
        let symbol = Symbol::parse(symbol).ok()?;
        let (region, currency) = match symbol.exchange_suffix() {
            Some("LON") => ("United Kingdom", "GBX"),
            _ => ("United States", "USD"),
        };
        Some(
            Instrument::new(symbol, name, asset_class)
                .with_region(region)
                .with_currency(currency),
        )
    })
    .collect()
}

fn symbol_seed(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().fold(11_u64, |acc, byte| {
        acc.wrapping_mul(31).wrapping_add(u64::from(byte))
    })
}

fn validation_to_error(error: ValidationError) -> SourceError {
    SourceError::internal(error.to_string())
}
