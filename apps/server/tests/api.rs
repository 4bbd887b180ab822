use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use stockview_market_data::{
    HistoryProvider, MarketDataError, Period, ProviderHistory, RateLimit, RawBar,
};
use stockview_server::{api::app_router, build_state_with_provider, config::Config};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

// 2024-04-01 13:30:00 UTC, a US market open.
const FIRST_BAR: i64 = 1_711_978_200;
const DAY: i64 = 86_400;

/// Canned histories keyed by instrument id. Unknown ids are "not found";
/// `BROKEN` fails with a non-retryable provider error and `HANG` never answers.
struct StubProvider {
    histories: HashMap<&'static str, ProviderHistory>,
}

impl StubProvider {
    fn new() -> Self {
        let mut histories = HashMap::new();
        histories.insert("AAPL", Self::history("America/New_York", &[170.0, 171.5]));
        histories.insert("RELIANCE.NS", Self::history("Asia/Kolkata", &[2900.0]));
        Self { histories }
    }

    fn history(timezone: &str, closes: &[f64]) -> ProviderHistory {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, close)| RawBar {
                timestamp: FIRST_BAR + i as i64 * DAY,
                open: Some(*close),
                high: Some(close + 2.0),
                low: Some(close - 2.0),
                close: Some(*close),
                volume: Some(10_000),
            })
            .collect();
        ProviderHistory {
            timezone: Some(timezone.to_string()),
            bars,
        }
    }
}

#[async_trait]
impl HistoryProvider for StubProvider {
    fn id(&self) -> &'static str {
        "STUB"
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 6_000,
            max_concurrency: 10,
            min_delay: Duration::ZERO,
        }
    }

    async fn get_history(
        &self,
        instrument_id: &str,
        _period: Period,
    ) -> Result<ProviderHistory, MarketDataError> {
        if instrument_id == "HANG" {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        if instrument_id == "BROKEN" {
            return Err(MarketDataError::ValidationFailed {
                message: "malformed response".to_string(),
            });
        }
        self.histories
            .get(instrument_id)
            .cloned()
            .ok_or_else(|| MarketDataError::SymbolNotFound(instrument_id.to_string()))
    }
}

async fn build_test_router() -> (Router, TempDir) {
    build_router_with(|_| {}).await
}

async fn build_router_with(tweak: impl FnOnce(&mut Config)) -> (Router, TempDir) {
    let tmp = tempdir().unwrap();
    let mut config = Config {
        db_path: tmp.path().join("test.db").to_string_lossy().to_string(),
        fetch_max_retries: 0,
        ..Config::default()
    };
    tweak(&mut config);
    let state = build_state_with_provider(&config, Arc::new(StubProvider::new()))
        .await
        .unwrap();
    (app_router(state, &config), tmp)
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_chart(app: &Router, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/charts")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_works() {
    let (app, _tmp) = build_test_router().await;

    let response = get(&app, "/api/v1/healthz").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}

#[tokio::test]
async fn options_list_markets_and_periods() {
    let (app, _tmp) = build_test_router().await;

    let body = json_body(get(&app, "/api/v1/options").await).await;

    assert_eq!(body["markets"].as_array().unwrap().len(), 2);
    assert_eq!(body["markets"][1]["value"], "NSE");
    assert_eq!(body["periods"].as_array().unwrap().len(), 5);
    assert_eq!(body["periods"][2]["label"], "1 Month");
    assert_eq!(body["defaultMarket"], "US");
    assert_eq!(body["defaultPeriod"], "1mo");
}

#[tokio::test]
async fn blank_symbol_list_is_no_content() {
    let (app, _tmp) = build_test_router().await;

    let response = post_chart(&app, json!({ "symbols": " , ", "period": "1mo" })).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let listed = json_body(get(&app, "/api/v1/series").await).await;
    assert_eq!(listed, json!([]));
}

#[tokio::test]
async fn unknown_period_is_bad_request() {
    let (app, _tmp) = build_test_router().await;

    let response = post_chart(&app, json!({ "symbols": "AAPL", "period": "10y" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], 400);
}

#[tokio::test]
async fn chart_plots_stored_symbols_and_reports_failures() {
    let (app, _tmp) = build_test_router().await;

    let response = post_chart(
        &app,
        json!({ "symbols": "aapl, broken, nodata", "period": "5d", "market": "US" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let chart = json_body(response).await;
    let traces = chart["data"].as_array().unwrap();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0]["name"], "AAPL (US)");
    assert_eq!(traces[0]["x"], json!(["2024-04-01", "2024-04-02"]));
    assert_eq!(chart["layout"]["title"]["text"], "US Stock Prices Over Time");
    assert_eq!(chart["layout"]["yaxis"]["title"]["text"], "Price (USD)");
    let warnings = chart["meta"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].as_str().unwrap().starts_with("BROKEN:"));

    assert_eq!(json_body(get(&app, "/api/v1/series").await).await, json!(["AAPL"]));
}

#[tokio::test]
async fn rerunning_a_chart_does_not_duplicate_days() {
    let (app, _tmp) = build_test_router().await;

    for _ in 0..2 {
        let response = post_chart(&app, json!({ "symbols": "AAPL" })).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let records = json_body(get(&app, "/api/v1/series/aapl").await).await;
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["symbol"], "AAPL");
    assert_eq!(records[0]["sourceReference"], "STUB:AAPL:1mo");
}

#[tokio::test]
async fn nse_symbols_are_stored_under_suffixed_key() {
    let (app, _tmp) = build_test_router().await;

    let response = post_chart(&app, json!({ "symbols": "reliance", "market": "NSE" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let chart = json_body(response).await;
    assert_eq!(chart["data"][0]["name"], "RELIANCE (NSE)");
    assert_eq!(chart["layout"]["yaxis"]["title"]["text"], "Price (INR)");

    let records = json_body(get(&app, "/api/v1/series/RELIANCE.NS").await).await;
    assert_eq!(records[0]["data"]["tradeDate"], "2024-04-01T19:00:00+05:30");
}

#[tokio::test]
async fn series_range_and_stored_chart() {
    let (app, _tmp) = build_test_router().await;
    post_chart(&app, json!({ "symbols": "AAPL" })).await;

    let ranged = json_body(get(&app, "/api/v1/series/AAPL?start=2024-04-02").await).await;
    assert_eq!(ranged.as_array().unwrap().len(), 1);

    let response = get(&app, "/api/v1/series/AAPL/chart").await;
    assert_eq!(response.status(), StatusCode::OK);
    let chart = json_body(response).await;
    assert_eq!(chart["data"][0]["name"], "Close Price");
    assert_eq!(chart["layout"]["title"]["text"], "AAPL Stock Price Over Time");

    let missing = get(&app, "/api/v1/series/ZZZZ/chart").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn slow_symbol_fails_alone_under_fetch_deadline() {
    let (app, _tmp) = build_router_with(|config| {
        config.fetch_timeout = Some(Duration::from_millis(100));
        config.request_timeout = Duration::from_secs(10);
    })
    .await;

    let response = post_chart(&app, json!({ "symbols": "AAPL, HANG" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let chart = json_body(response).await;
    assert_eq!(chart["data"].as_array().unwrap().len(), 1);
    assert_eq!(chart["data"][0]["name"], "AAPL (US)");
    let warnings = chart["meta"]["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    let warning = warnings[0].as_str().unwrap();
    assert!(warning.starts_with("HANG:"), "{warning}");
    assert!(warning.contains("Timeout"), "{warning}");
}

#[tokio::test]
async fn chart_run_past_request_timeout_answers_with_error_chart() {
    let (app, _tmp) = build_router_with(|config| {
        config.fetch_timeout = None;
        config.request_timeout = Duration::from_millis(300);
    })
    .await;

    let response = post_chart(&app, json!({ "symbols": "HANG" })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let chart = json_body(response).await;
    assert_eq!(chart["meta"]["error"], true);
    assert_eq!(chart["data"], json!([]));
    let title = chart["layout"]["title"]["text"].as_str().unwrap();
    assert!(title.starts_with("Error: Timed out after 300ms"), "{title}");

    // Other routes keep their own request timeout.
    let health = get(&app, "/api/v1/healthz").await;
    assert_eq!(health.status(), StatusCode::OK);
}
