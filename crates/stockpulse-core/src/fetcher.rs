//! Single-listing fetch orchestration.
//!
//! Price path: cache, then the primary source unless the failure tracker
//! bypasses it, then the secondary source. Fundamentals path: cache, then the
//! fundamentals source. The two paths run concurrently and fail independently.

use std::sync::Arc;

use crate::adapters::{GoogleFinanceSource, YahooChartSource, YahooPageSource};
use crate::cache::{CachedValue, TtlCache};
use crate::clock::{Clock, SystemClock};
use crate::config::FetcherConfig;
use crate::domain::{CacheKind, Fundamentals, Listing, QuoteResult};
use crate::error::FetchError;
use crate::failure_tracker::FailureTracker;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::source::{FundamentalsSource, PriceSource, SourceError};

/// Everything known about one listing after a fetch round.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    pub listing: Listing,
    pub price: Result<f64, FetchError>,
    pub fundamentals: Fundamentals,
}

impl SymbolOutcome {
    /// Outcome for a fetch that never completed.
    pub fn failed(listing: Listing, message: impl Into<String>) -> Self {
        let error = FetchError::TaskFailed {
            listing: listing.clone(),
            message: message.into(),
        };
        Self {
            listing,
            price: Err(error),
            fundamentals: Fundamentals::unavailable(),
        }
    }

    pub fn current_price(&self) -> Option<f64> {
        self.price.as_ref().ok().copied()
    }

    /// Wire shape of the outcome; a price failure becomes `null`.
    pub fn into_quote_result(self) -> QuoteResult {
        QuoteResult::new(
            self.listing.symbol.as_str(),
            self.price.ok(),
            self.fundamentals,
        )
    }
}

/// Fetches price and fundamentals for one listing.
///
/// Holds the process-wide cache and failure tracker; share it behind an
/// `Arc` across concurrent fetches.
pub struct SymbolFetcher {
    cache: Arc<TtlCache<CachedValue>>,
    tracker: Arc<FailureTracker>,
    primary: Arc<dyn PriceSource>,
    secondary: Arc<dyn PriceSource>,
    fundamentals: Arc<dyn FundamentalsSource>,
    config: FetcherConfig,
}

impl SymbolFetcher {
    pub fn builder() -> SymbolFetcherBuilder {
        SymbolFetcherBuilder::default()
    }

    pub fn cache(&self) -> &Arc<TtlCache<CachedValue>> {
        &self.cache
    }

    pub fn failure_tracker(&self) -> &Arc<FailureTracker> {
        &self.tracker
    }

    pub const fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Price and fundamentals for `listing`, fetched concurrently.
    pub async fn fetch(&self, listing: &Listing) -> SymbolOutcome {
        let (price, fundamentals) =
            tokio::join!(self.fetch_price(listing), self.fetch_fundamentals(listing));

        SymbolOutcome {
            listing: listing.clone(),
            price,
            fundamentals,
        }
    }

    /// Current price, from cache or upstream.
    ///
    /// A cache hit touches neither the sources nor the failure tracker. Only
    /// a primary-source success clears the listing's failure streak.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::BothSourcesUnavailable`] when no source produced
    /// a price this round.
    pub async fn fetch_price(&self, listing: &Listing) -> Result<f64, FetchError> {
        let key = listing.cache_key(CacheKind::Price);
        if let Some(CachedValue::Price(price)) = self.cache.get(&key) {
            tracing::debug!(%listing, price, "price cache hit");
            return Ok(price);
        }

        let primary_error = if self.tracker.should_bypass_primary(listing) {
            tracing::debug!(%listing, source = %self.primary.id(), "primary price source bypassed");
            None
        } else {
            match self.price_from(self.primary.as_ref(), listing).await {
                Ok(price) => {
                    self.tracker.record_success(listing);
                    self.cache
                        .put(key, CachedValue::Price(price), self.config.price_ttl);
                    return Ok(price);
                }
                Err(error) => {
                    self.tracker.record_failure(listing);
                    tracing::warn!(
                        %listing,
                        code = error.code(),
                        %error,
                        "primary price source failed"
                    );
                    Some(error)
                }
            }
        };

        match self.price_from(self.secondary.as_ref(), listing).await {
            Ok(price) => {
                self.cache
                    .put(key, CachedValue::Price(price), self.config.price_ttl);
                Ok(price)
            }
            Err(secondary) => {
                tracing::error!(
                    %listing,
                    code = secondary.code(),
                    error = %secondary,
                    "no price source available"
                );
                Err(FetchError::BothSourcesUnavailable {
                    listing: listing.clone(),
                    primary: primary_error,
                    secondary,
                })
            }
        }
    }

    /// P/E ratio and EPS, from cache or upstream. Degraded results are cached
    /// like any other.
    pub async fn fetch_fundamentals(&self, listing: &Listing) -> Fundamentals {
        let key = listing.cache_key(CacheKind::Fundamentals);
        if let Some(CachedValue::Fundamentals(fundamentals)) = self.cache.get(&key) {
            tracing::debug!(%listing, "fundamentals cache hit");
            return fundamentals;
        }

        let source = self.fundamentals.as_ref();
        let fundamentals = match tokio::time::timeout(
            self.config.source_timeout,
            source.fetch_fundamentals(listing),
        )
        .await
        {
            Ok(fundamentals) => fundamentals,
            Err(_) => {
                let error =
                    SourceError::timeout(source.id(), self.config.source_timeout.as_millis());
                tracing::warn!(%listing, code = error.code(), %error, "fundamentals unavailable");
                Fundamentals::unavailable()
            }
        };

        self.cache.put(
            key,
            CachedValue::Fundamentals(fundamentals),
            self.config.fundamentals_ttl,
        );
        fundamentals
    }

    /// Drops both cached entries for `listing`. Returns true if any existed.
    pub fn invalidate(&self, listing: &Listing) -> bool {
        let price = self.cache.invalidate(&listing.cache_key(CacheKind::Price));
        let fundamentals = self
            .cache
            .invalidate(&listing.cache_key(CacheKind::Fundamentals));
        price || fundamentals
    }

    async fn price_from(
        &self,
        source: &dyn PriceSource,
        listing: &Listing,
    ) -> Result<f64, SourceError> {
        match tokio::time::timeout(self.config.source_timeout, source.fetch_price(listing)).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::timeout(
                source.id(),
                self.config.source_timeout.as_millis(),
            )),
        }
    }
}

/// Builder for [`SymbolFetcher`].
///
/// Anything not injected falls back to the production wiring: Yahoo page as
/// primary, Yahoo chart as secondary, Google Finance for fundamentals, all
/// over one shared reqwest client.
#[derive(Default)]
pub struct SymbolFetcherBuilder {
    config: Option<FetcherConfig>,
    clock: Option<Arc<dyn Clock>>,
    http_client: Option<Arc<dyn HttpClient>>,
    cache: Option<Arc<TtlCache<CachedValue>>>,
    tracker: Option<Arc<FailureTracker>>,
    primary: Option<Arc<dyn PriceSource>>,
    secondary: Option<Arc<dyn PriceSource>>,
    fundamentals: Option<Arc<dyn FundamentalsSource>>,
}

impl SymbolFetcherBuilder {
    pub fn config(mut self, config: FetcherConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Transport shared by the default adapters.
    pub fn http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn cache(mut self, cache: Arc<TtlCache<CachedValue>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn failure_tracker(mut self, tracker: Arc<FailureTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    pub fn primary(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.primary = Some(source);
        self
    }

    pub fn secondary(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.secondary = Some(source);
        self
    }

    pub fn fundamentals(mut self, source: Arc<dyn FundamentalsSource>) -> Self {
        self.fundamentals = Some(source);
        self
    }

    pub fn build(self) -> SymbolFetcher {
        let config = self.config.unwrap_or_default();
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let http_client = self
            .http_client
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let timeout_ms = u64::try_from(config.source_timeout.as_millis()).unwrap_or(u64::MAX);

        SymbolFetcher {
            cache: self
                .cache
                .unwrap_or_else(|| Arc::new(TtlCache::new(clock.clone()))),
            tracker: self
                .tracker
                .unwrap_or_else(|| Arc::new(FailureTracker::new(config.tracker_config(), clock))),
            primary: self.primary.unwrap_or_else(|| {
                Arc::new(YahooPageSource::new(http_client.clone()).with_timeout_ms(timeout_ms))
            }),
            secondary: self.secondary.unwrap_or_else(|| {
                Arc::new(YahooChartSource::new(http_client.clone()).with_timeout_ms(timeout_ms))
            }),
            fundamentals: self.fundamentals.unwrap_or_else(|| {
                Arc::new(GoogleFinanceSource::new(http_client).with_timeout_ms(timeout_ms))
            }),
            config,
        }
    }
}
