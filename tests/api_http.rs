// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /fx-data (default symbols, explicit symbols, envelope shape)
// - GET /news (envelope shape, classified fields)
// - 405 on non-GET, 500 envelope on a malformed symbols parameter

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use fx_market_pulse::api::{self, AppState};
use fx_market_pulse::cache::TtlCache;
use fx_market_pulse::config::{SourceFailurePolicy, DEFAULT_SYMBOLS};
use fx_market_pulse::fx::browser::{QuoteBrowser, QuoteSession};
use fx_market_pulse::fx::{FxIngestor, FxSettings};
use fx_market_pulse::news::fetch::FeedClient;
use fx_market_pulse::news::NewsIngestor;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests
const FEED_XML: &str = include_str!("fixtures/financial_juice_rss.xml");

/// Browser stub serving one fixed live quote for every symbol.
struct FakeBrowser;
struct FakeSession(HashMap<&'static str, &'static str>);

#[async_trait]
impl QuoteBrowser for FakeBrowser {
    async fn start_session(&self) -> Result<Box<dyn QuoteSession>> {
        Ok(Box::new(FakeSession(
            [
                (".js-symbol-last", "1.0852"),
                (".js-symbol-change-pt", "0.12%"),
            ]
            .into_iter()
            .collect(),
        )))
    }
}

#[async_trait]
impl QuoteSession for FakeSession {
    async fn open_symbol(&mut self, _symbol: &str) -> Result<()> {
        Ok(())
    }
    async fn text_of(&self, selector: &str) -> Option<String> {
        self.0.get(selector).map(|s| s.to_string())
    }
    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Build the same Router shape the binary uses, on test doubles.
fn test_router() -> Router {
    let fx = Arc::new(FxIngestor::new(
        Box::new(FakeBrowser),
        TtlCache::new(Duration::from_secs(30)),
        FxSettings {
            symbol_delay: Duration::ZERO,
            nav_timeout: Duration::from_secs(5),
            on_failure: SourceFailurePolicy::Synthesize,
        },
    ));
    let news = Arc::new(NewsIngestor::new(
        Box::new(FeedClient::from_fixture_str(FEED_XML)),
        TtlCache::new(Duration::from_secs(300)),
        SourceFailurePolicy::EmptyResult,
    ));
    let default_symbols = Arc::new(DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect());
    api::router(AppState {
        fx,
        news,
        default_symbols,
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let json = serde_json::from_slice(&bytes).expect("parse json body");
    (status, json)
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    assert_eq!(String::from_utf8(bytes).expect("utf8").trim(), "ok");
}

#[tokio::test]
async fn fx_data_without_symbols_uses_the_default_ten() {
    let (status, v) = get_json(test_router(), "/fx-data").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["success"], true);
    assert_eq!(v["count"], 10);
    assert_eq!(v["cached"], false);
    assert!(v.get("timestamp").is_some(), "missing 'timestamp'");

    let data = v["data"].as_array().expect("data must be an array");
    assert_eq!(data.len(), 10);
    let returned: Vec<&str> = data.iter().map(|q| q["symbol"].as_str().unwrap()).collect();
    assert_eq!(returned, DEFAULT_SYMBOLS.to_vec());
}

#[tokio::test]
async fn fx_data_quote_shape_is_camel_case_for_the_ui() {
    let (_, v) = get_json(test_router(), "/fx-data?symbols=EURUSD").await;
    let q = &v["data"][0];

    assert_eq!(q["symbol"], "EURUSD");
    assert!(q.get("bid").is_some(), "missing 'bid'");
    assert!(q.get("ask").is_some(), "missing 'ask'");
    assert!(q.get("changePercent").is_some(), "missing 'changePercent'");
    assert_eq!(q["isSynthetic"], false, "fixed live quote from the stub");
    assert_eq!(q["history"].as_array().unwrap().len(), 24);
}

#[tokio::test]
async fn fx_data_respects_requested_order_and_lowercase_input() {
    let (_, v) = get_json(test_router(), "/fx-data?symbols=usdjpy,EURUSD").await;
    let data = v["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["symbol"], "USDJPY");
    assert_eq!(data[1]["symbol"], "EURUSD");
}

#[tokio::test]
async fn fx_data_with_empty_symbol_list_is_a_500_envelope() {
    let (status, v) = get_json(test_router(), "/fx-data?symbols=,,,").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(v["success"], false);
    assert!(v.get("error").is_some(), "missing 'error'");
    assert_eq!(v["data"].as_array().unwrap().len(), 0);
    assert!(v.get("timestamp").is_some(), "missing 'timestamp'");
}

#[tokio::test]
async fn news_envelope_carries_classified_items() {
    let (status, v) = get_json(test_router(), "/news").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(v["success"], true);
    assert_eq!(v["cached"], false);
    let items = v["news"].as_array().expect("news must be an array");
    assert_eq!(v["count"], items.len() as u64);

    let first = &items[0];
    assert_eq!(first["impactLevel"], "HIGH");
    assert!(first["currencies"]
        .as_array()
        .unwrap()
        .contains(&Json::String("USD".into())));
    assert!(first.get("publishedAt").is_some(), "missing 'publishedAt'");
    assert_eq!(first["source"], "Financial Juice");
}

#[tokio::test]
async fn second_poll_reports_cached_true() {
    let app = test_router();
    let (_, first) = get_json(app.clone(), "/news").await;
    let (_, second) = get_json(app, "/news").await;
    assert_eq!(first["cached"], false);
    assert_eq!(second["cached"], true);
}

#[tokio::test]
async fn non_get_methods_are_rejected_with_405() {
    for uri in ["/fx-data", "/news"] {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .expect("build POST");
        let resp = test_router().oneshot(req).await.expect("oneshot");
        assert_eq!(
            resp.status(),
            StatusCode::METHOD_NOT_ALLOWED,
            "POST {uri} must be 405"
        );
    }
}

#[tokio::test]
async fn options_answers_200_with_no_body() {
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/fx-data")
        .body(Body::empty())
        .expect("build OPTIONS");
    let resp = test_router().oneshot(req).await.expect("oneshot");
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    assert!(bytes.is_empty());
}
