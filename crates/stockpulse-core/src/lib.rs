//! # Stockpulse Core
//!
//! Multi-source quote and fundamentals fetching for portfolio tracking.
//!
//! ## Overview
//!
//! - **Price path** with a scraped primary source, an API fallback and a
//!   per-listing failure tracker that bypasses the primary while it is degraded
//! - **Fundamentals path** (P/E ratio, EPS) that degrades to `null` instead of
//!   failing
//! - **TTL cache** shared by both paths
//! - **Batch orchestrator** that fans out one task per listing and never fails
//!   as a whole
//! - **Portfolio valuation** over the resulting quote map
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Yahoo page, Yahoo chart and Google Finance sources |
//! | [`batch`] | Concurrent batch fetch into a [`QuoteMap`] |
//! | [`cache`] | In-memory TTL cache |
//! | [`clock`] | Injectable time source |
//! | [`config`] | Fetcher tunables and environment overlay |
//! | [`domain`] | Symbols, listings and quote results |
//! | [`error`] | Core error types |
//! | [`failure_tracker`] | Consecutive-failure breaker for the primary source |
//! | [`fetcher`] | Single-listing fetch with fallback |
//! | [`http_client`] | HTTP client abstraction |
//! | [`portfolio`] | Holdings and valuation helpers |
//! | [`source`] | Source traits and structured source errors |
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │ BatchOrchestrator │  one task per listing
//! └─────────┬─────────┘
//!           ▼
//! ┌───────────────────┐     ┌──────────────────┐
//! │  SymbolFetcher    │────▶│ TtlCache         │
//! │                   │────▶│ FailureTracker   │
//! └─────────┬─────────┘     └──────────────────┘
//!           ▼
//! ┌───────────────────┐     ┌──────────────────┐
//! │ Price/Fundamentals│────▶│ HTTP Client      │
//! │ sources           │     │ (reqwest)        │
//! └───────────────────┘     └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockpulse_core::{BatchOrchestrator, Listing, SymbolFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = Arc::new(SymbolFetcher::builder().build());
//!     let batch = BatchOrchestrator::new(fetcher);
//!
//!     let quotes = batch.fetch_batch(&["TCS:NSE".parse::<Listing>()?]).await;
//!     if let Some(tcs) = quotes.get("TCS") {
//!         println!("TCS: {:?}", tcs.current_price);
//!     }
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod batch;
pub mod cache;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod failure_tracker;
pub mod fetcher;
pub mod http_client;
pub mod portfolio;
pub mod source;

// Adapter implementations
pub use adapters::{GoogleFinanceSource, YahooChartSource, YahooPageSource};

// Orchestration
pub use batch::{BatchOrchestrator, BatchSummary};
pub use fetcher::{SymbolFetcher, SymbolFetcherBuilder, SymbolOutcome};

// Shared state
pub use cache::{CachedValue, TtlCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use failure_tracker::{CircuitState, FailureTracker, FailureTrackerConfig};

// Configuration
pub use config::FetcherConfig;

// Domain models
pub use domain::{CacheKind, Exchange, Fundamentals, Listing, QuoteMap, QuoteResult, Symbol};

// Error types
pub use error::{ConfigError, CoreError, FetchError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Portfolio valuation
pub use portfolio::{
    Holding, HoldingRow, Portfolio, PortfolioReport, Sector, SectorReport, SectorSummary,
};

// Source contracts
pub use source::{
    FundamentalsFuture, FundamentalsSource, PriceFuture, PriceSource, SourceError,
    SourceErrorKind, SourceId,
};
