use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tickerlens_core::{
    AlphaVantageAdapter, DailySeriesRequest, DataSource, HttpClient, HttpError, HttpRequest,
    HttpResponse, ProviderId, ProviderPolicy, SearchRequest, SourceErrorKind, Symbol,
};

/// Real-mode transport that records requests and replays one canned reply.
struct RecordingHttpClient {
    reply: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl RecordingHttpClient {
    fn replying(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(HttpResponse {
                status,
                body: body.to_owned(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(HttpError::new(message)),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.lock().expect("lock").push(request);
            self.reply.clone()
        })
    }
}

const DAILY_PAYLOAD: &str = r#"{
    "Meta Data": {
        "1. Information": "Daily Prices (open, high, low, close) and Volumes",
        "2. Symbol": "IBM",
        "3. Last Refreshed": "2024-03-08",
        "4. Output Size": "Compact",
        "5. Time Zone": "US/Eastern"
    },
    "Time Series (Daily)": {
        "2024-03-08": {"1. open": "195.09", "2. high": "197.77", "3. low": "194.38", "4. close": "196.16", "5. volume": "4015296"},
        "2024-03-07": {"1. open": "197.59", "2. high": "198.00", "3. low": "195.29", "4. close": "196.54", "5. volume": "3763256"},
        "2024-03-06": {"1. open": "193.50", "2. high": "198.13", "3. low": "192.96", "4. close": "195.95", "5. volume": "5064502"},
        "2024-03-05": {"1. open": "192.00", "2. high": "192.94", "3. low": "190.57", "4. close": "191.95", "5. volume": "3924289"}
    }
}"#;

const SEARCH_PAYLOAD: &str = r#"{
    "bestMatches": [
        {"1. symbol": "TSCO.LON", "2. name": "Tesco PLC", "3. type": "Equity", "4. region": "United Kingdom",
         "5. marketOpen": "08:00", "6. marketClose": "16:30", "7. timezone": "UTC+01", "8. currency": "GBX", "9. matchScore": "0.7273"},
        {"1. symbol": "TSCDF", "2. name": "Tesco plc", "3. type": "Equity", "4. region": "United States",
         "5. marketOpen": "09:30", "6. marketClose": "16:00", "7. timezone": "UTC-04", "8. currency": "USD", "9. matchScore": "0.7143"}
    ]
}"#;

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn adapter(client: Arc<RecordingHttpClient>) -> AlphaVantageAdapter {
    AlphaVantageAdapter::with_http_client(client, Some(String::from("demo-key")))
}

#[tokio::test]
async fn parses_recorded_daily_series_newest_first() {
    let client = RecordingHttpClient::replying(200, DAILY_PAYLOAD);
    let adapter = adapter(client.clone());
    assert!(!adapter.is_offline());

    let series = adapter
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect("series");

    assert_eq!(series.len(), 4);
    assert_eq!(series.latest().date.to_string(), "2024-03-08");
    assert_eq!(series.latest().close, 196.16);
    assert_eq!(series.earliest().close, 191.95);
    assert_eq!(series.latest().volume, 4_015_296);

    let requests = client.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query_value("function"), Some("TIME_SERIES_DAILY"));
    assert_eq!(requests[0].query_value("symbol"), Some("IBM"));
    assert_eq!(requests[0].query_value("outputsize"), Some("compact"));
    assert_eq!(requests[0].query_value("apikey"), Some("demo-key"));
    assert!(!requests[0].redacted_url().contains("demo-key"));
}

#[tokio::test]
async fn limit_keeps_most_recent_bars() {
    let adapter = adapter(RecordingHttpClient::replying(200, DAILY_PAYLOAD));

    let series = adapter
        .daily_series(DailySeriesRequest::new(symbol("IBM"), 2).expect("request"))
        .await
        .expect("series");

    assert_eq!(series.len(), 2);
    assert_eq!(series.earliest().date.to_string(), "2024-03-07");
}

#[tokio::test]
async fn policy_timeout_reaches_transport() {
    let client = RecordingHttpClient::replying(200, DAILY_PAYLOAD);
    let adapter = adapter(client.clone()).with_policy(
        ProviderPolicy::alphavantage_default().with_request_timeout(Duration::from_millis(750)),
    );

    adapter
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect("series");

    assert_eq!(client.requests()[0].timeout_ms, 750);
}

#[tokio::test]
async fn missing_api_key_fails_without_calling_upstream() {
    let client = RecordingHttpClient::replying(200, DAILY_PAYLOAD);
    let adapter = AlphaVantageAdapter::with_http_client(client.clone(), Some(String::from("  ")));

    let error = adapter
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::MissingCredentials);
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn rate_limit_note_maps_to_rate_limited() {
    let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
    let adapter = adapter(RecordingHttpClient::replying(200, body));

    let error = adapter
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert!(error.message().contains("5 calls per minute"));
}

#[tokio::test]
async fn information_message_maps_to_rate_limited() {
    let body = r#"{"Information": "We have detected your API key and our standard API rate limit is 25 requests per day."}"#;
    let adapter = adapter(RecordingHttpClient::replying(200, body));

    let error = adapter
        .search(SearchRequest::new("tesco", 5).expect("request"))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
}

#[tokio::test]
async fn error_message_maps_to_invalid_request() {
    let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation for TIME_SERIES_DAILY."}"#;
    let adapter = adapter(RecordingHttpClient::replying(200, body));

    let error = adapter
        .daily_series(DailySeriesRequest::compact(symbol("NOPE")))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert_eq!(error.code(), "source.invalid_request");
}

#[tokio::test]
async fn empty_time_series_is_no_data() {
    let body = r#"{"Meta Data": {"2. Symbol": "IBM"}, "Time Series (Daily)": {}}"#;
    let adapter = adapter(RecordingHttpClient::replying(200, body));

    let error = adapter
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::NoData);
}

#[tokio::test]
async fn server_errors_and_transport_failures_are_unavailable() {
    let adapter_500 = adapter(RecordingHttpClient::replying(503, "Service Unavailable"));
    let error = adapter_500
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);

    let adapter_down = adapter(RecordingHttpClient::failing("connection failed: refused"));
    let error = adapter_down
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.message().contains("connection failed"));
}

#[tokio::test]
async fn malformed_body_is_internal_error() {
    let adapter = adapter(RecordingHttpClient::replying(200, "<html>maintenance</html>"));

    let error = adapter
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::Internal);
}

#[tokio::test]
async fn search_maps_best_matches() {
    let client = RecordingHttpClient::replying(200, SEARCH_PAYLOAD);
    let adapter = adapter(client.clone());

    let batch = adapter
        .search(SearchRequest::new("tesco", 1).expect("request"))
        .await
        .expect("batch");

    assert_eq!(adapter.id(), ProviderId::Alphavantage);
    assert_eq!(batch.query, "tesco");
    assert_eq!(batch.results.len(), 1);
    assert_eq!(batch.results[0].symbol.as_str(), "TSCO.LON");
    assert_eq!(batch.results[0].currency.as_deref(), Some("GBX"));
    assert_eq!(client.requests()[0].query_value("keywords"), Some("tesco"));
}

#[tokio::test]
async fn quota_gate_refuses_sixth_call_within_window() {
    let client = RecordingHttpClient::replying(200, DAILY_PAYLOAD);
    let adapter = adapter(client.clone());

    for _ in 0..5 {
        adapter
            .daily_series(DailySeriesRequest::compact(symbol("IBM")))
            .await
            .expect("series");
    }

    let error = adapter
        .daily_series(DailySeriesRequest::compact(symbol("IBM")))
        .await
        .expect_err("sixth call should be refused");

    assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    assert_eq!(client.requests().len(), 5);
}
