// src/api.rs
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::fx::types::Quote;
use crate::fx::FxIngestor;
use crate::news::types::NewsItem;
use crate::news::NewsIngestor;

#[derive(Clone)]
pub struct AppState {
    pub fx: Arc<FxIngestor>,
    pub news: Arc<NewsIngestor>,
    pub default_symbols: Arc<Vec<String>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/fx-data", get(fx_data).options(preflight_ok))
        .route("/news", get(news).options(preflight_ok))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

// Bare OPTIONS (outside a CORS preflight) still answers 200, no body.
async fn preflight_ok() -> StatusCode {
    StatusCode::OK
}

#[derive(serde::Deserialize)]
struct FxQuery {
    symbols: Option<String>,
}

#[derive(serde::Serialize)]
struct FxResponse {
    success: bool,
    data: Vec<Quote>,
    timestamp: DateTime<Utc>,
    count: usize,
    cached: bool,
}

#[derive(serde::Serialize)]
struct NewsResponse {
    success: bool,
    news: Vec<NewsItem>,
    timestamp: DateTime<Utc>,
    count: usize,
    cached: bool,
}

/// Caller-boundary failure: a well-formed `500` envelope, never a bare
/// error string. Everything below this layer degrades instead of
/// erroring, so in practice only malformed requests land here.
struct ApiError {
    message: String,
    payload_key: &'static str,
}

impl ApiError {
    fn fx(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload_key: "data",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = serde_json::Map::new();
        body.insert("success".into(), serde_json::Value::Bool(false));
        body.insert("error".into(), serde_json::Value::String(self.message));
        body.insert(
            self.payload_key.into(),
            serde_json::Value::Array(Vec::new()),
        );
        body.insert("timestamp".into(), serde_json::json!(Utc::now()));
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::Value::Object(body)),
        )
            .into_response()
    }
}

async fn fx_data(
    State(state): State<AppState>,
    Query(q): Query<FxQuery>,
) -> Result<Json<FxResponse>, ApiError> {
    let symbols = match q.symbols.as_deref() {
        None => state.default_symbols.as_ref().clone(),
        Some(raw) => {
            let parsed: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_ascii_uppercase())
                .filter(|s| !s.is_empty())
                .collect();
            if parsed.is_empty() {
                return Err(ApiError::fx("symbols parameter contained no symbols"));
            }
            parsed
        }
    };

    let (data, cached) = state.fx.get_quotes(&symbols).await;
    Ok(Json(FxResponse {
        success: true,
        count: data.len(),
        data,
        timestamp: Utc::now(),
        cached,
    }))
}

async fn news(State(state): State<AppState>) -> Json<NewsResponse> {
    let (news, cached) = state.news.get_news().await;
    Json(NewsResponse {
        success: true,
        count: news.len(),
        news,
        timestamp: Utc::now(),
        cached,
    })
}
