use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use stockpulse_core::{BatchOrchestrator, Listing};

use crate::cli::ServeArgs;
use crate::error::CliError;

use super::CommandOutput;

/// Listings accepted per request; the rest are dropped.
pub const MAX_SYMBOLS_PER_REQUEST: usize = 50;

const INVALID_SYMBOLS: &str = "Invalid or missing symbols array";

pub async fn run(
    args: &ServeArgs,
    orchestrator: BatchOrchestrator,
) -> Result<CommandOutput, CliError> {
    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    tracing::info!(bind = %args.bind, "serving /api/stocks");

    axum::serve(listener, router(Arc::new(orchestrator))).await?;
    Ok(CommandOutput::Served)
}

pub fn router(orchestrator: Arc<BatchOrchestrator>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/stocks", post(fetch_stocks))
        .with_state(orchestrator)
}

async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct StocksRequest {
    symbols: Option<Vec<SymbolEntry>>,
}

#[derive(Debug, Deserialize)]
struct SymbolEntry {
    symbol: String,
    #[serde(default)]
    exchange: String,
}

async fn fetch_stocks(
    State(orchestrator): State<Arc<BatchOrchestrator>>,
    payload: Result<Json<StocksRequest>, JsonRejection>,
) -> Response {
    let Some(listings) = payload.ok().and_then(|Json(request)| listings_from(request)) else {
        return bad_request();
    };

    let quotes = orchestrator.fetch_batch(&listings).await;
    (StatusCode::OK, Json(json!({ "stockData": quotes }))).into_response()
}

fn listings_from(request: StocksRequest) -> Option<Vec<Listing>> {
    let symbols = request.symbols.filter(|symbols| !symbols.is_empty())?;
    symbols
        .into_iter()
        .take(MAX_SYMBOLS_PER_REQUEST)
        .map(|entry| Listing::parse(&entry.symbol, &entry.exchange).ok())
        .collect()
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": INVALID_SYMBOLS }))).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use stockpulse_core::{
        Fundamentals, FundamentalsFuture, FundamentalsSource, ManualClock, PriceFuture,
        PriceSource, SourceError, SourceId, SymbolFetcher,
    };
    use tower::ServiceExt;

    use super::*;

    #[derive(Default)]
    struct CountingPrice {
        calls: AtomicUsize,
    }

    impl PriceSource for CountingPrice {
        fn id(&self) -> SourceId {
            SourceId::Custom("counting")
        }

        fn fetch_price<'a>(&'a self, listing: &'a Listing) -> PriceFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if listing.symbol.as_str() == "GONE" {
                Err(SourceError::missing_price(self.id(), listing))
            } else {
                Ok(100.0)
            };
            Box::pin(async move { result })
        }
    }

    struct FlatFundamentals;

    impl FundamentalsSource for FlatFundamentals {
        fn id(&self) -> SourceId {
            SourceId::Custom("flat")
        }

        fn fetch_fundamentals<'a>(&'a self, _listing: &'a Listing) -> FundamentalsFuture<'a> {
            Box::pin(async { Fundamentals::new(Some(20.0), Some(5.0)) })
        }
    }

    fn app() -> (Router, Arc<CountingPrice>) {
        let primary = Arc::new(CountingPrice::default());
        let fetcher = SymbolFetcher::builder()
            .clock(Arc::new(ManualClock::new()))
            .primary(primary.clone())
            .secondary(Arc::new(CountingPrice::default()))
            .fundamentals(Arc::new(FlatFundamentals))
            .build();
        (router(Arc::new(BatchOrchestrator::new(Arc::new(fetcher)))), primary)
    }

    async fn post_json(app: Router, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/stocks")
            .header("content-type", "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request should build");

        let response = app.oneshot(request).await.expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let json = serde_json::from_slice(&bytes).expect("body should be json");
        (status, json)
    }

    #[tokio::test]
    async fn returns_stock_data_keyed_by_symbol() {
        let (app, _) = app();

        let (status, body) = post_json(
            app,
            r#"{"symbols":[{"symbol":"TCS","exchange":"NSE"},{"symbol":"GONE","exchange":"BSE"}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"stockData": {
                "GONE": {"currentPrice": null, "peRatio": 20.0, "earnings": 5.0},
                "TCS": {"currentPrice": 100.0, "peRatio": 20.0, "earnings": 5.0}
            }})
        );
    }

    #[tokio::test]
    async fn rejects_missing_empty_or_malformed_symbols() {
        for body in [
            r#"{}"#,
            r#"{"symbols":[]}"#,
            r#"{"symbols":"TCS"}"#,
            r#"{"symbols":[{"symbol":"","exchange":"NSE"}]}"#,
            "not json",
        ] {
            let (app, primary) = app();
            let (status, json) = post_json(app, body).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
            assert_eq!(json, json!({"error": "Invalid or missing symbols array"}));
            assert_eq!(primary.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn caps_request_at_fifty_symbols() {
        let (app, primary) = app();
        let symbols: Vec<Value> = (0..60)
            .map(|index| json!({"symbol": format!("SYM{index}"), "exchange": "NSE"}))
            .collect();

        let (status, body) = post_json(app, &json!({ "symbols": symbols }).to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stockData"].as_object().map(|map| map.len()), Some(50));
        assert_eq!(primary.calls.load(Ordering::SeqCst), 50);
    }

    #[tokio::test]
    async fn health_check_answers_ok() {
        let (app, _) = app();
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .expect("request should build");

        let response = app.oneshot(request).await.expect("router is infallible");

        assert_eq!(response.status(), StatusCode::OK);
    }
}
