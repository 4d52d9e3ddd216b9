//! Call-counting source doubles and a fetcher harness shared by the
//! behaviour tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use stockpulse_core::{
    BatchOrchestrator, FetcherConfig, Fundamentals, FundamentalsFuture, FundamentalsSource,
    Listing, ManualClock, PriceFuture, PriceSource, SourceError, SourceId, SymbolFetcher,
};

/// What a mock price source does on its next call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceBehavior {
    Price(f64),
    Fail,
    Panic,
    Hang,
}

pub struct MockPriceSource {
    name: &'static str,
    default: Mutex<PriceBehavior>,
    overrides: Mutex<HashMap<String, PriceBehavior>>,
    calls: AtomicUsize,
}

impl MockPriceSource {
    pub fn new(name: &'static str, behavior: PriceBehavior) -> Arc<Self> {
        Arc::new(Self {
            name,
            default: Mutex::new(behavior),
            overrides: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, behavior: PriceBehavior) {
        *self.default.lock().expect("mock lock") = behavior;
    }

    pub fn set_for(&self, symbol: &str, behavior: PriceBehavior) {
        self.overrides
            .lock()
            .expect("mock lock")
            .insert(symbol.to_owned(), behavior);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn behavior_for(&self, listing: &Listing) -> PriceBehavior {
        let overridden = self
            .overrides
            .lock()
            .expect("mock lock")
            .get(listing.symbol.as_str())
            .copied();
        overridden.unwrap_or_else(|| *self.default.lock().expect("mock lock"))
    }
}

impl PriceSource for MockPriceSource {
    fn id(&self) -> SourceId {
        SourceId::Custom(self.name)
    }

    fn fetch_price<'a>(&'a self, listing: &'a Listing) -> PriceFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior_for(listing);
        Box::pin(async move {
            match behavior {
                PriceBehavior::Price(price) => Ok(price),
                PriceBehavior::Fail => Err(SourceError::status(self.id(), 503)),
                PriceBehavior::Panic => panic!("{} blew up on {listing}", self.name),
                PriceBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(0.0)
                }
            }
        })
    }
}

pub struct MockFundamentalsSource {
    fundamentals: Mutex<Fundamentals>,
    calls: AtomicUsize,
}

impl MockFundamentalsSource {
    pub fn new(fundamentals: Fundamentals) -> Arc<Self> {
        Arc::new(Self {
            fundamentals: Mutex::new(fundamentals),
            calls: AtomicUsize::new(0),
        })
    }

    /// Every call degrades to nulls, as the real source does on outage.
    pub fn outage() -> Arc<Self> {
        Self::new(Fundamentals::unavailable())
    }

    pub fn set(&self, fundamentals: Fundamentals) {
        *self.fundamentals.lock().expect("mock lock") = fundamentals;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FundamentalsSource for MockFundamentalsSource {
    fn id(&self) -> SourceId {
        SourceId::Custom("mock_fundamentals")
    }

    fn fetch_fundamentals<'a>(&'a self, _listing: &'a Listing) -> FundamentalsFuture<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let fundamentals = *self.fundamentals.lock().expect("mock lock");
        Box::pin(async move { fundamentals })
    }
}

/// Fetcher wired to mocks and a manual clock.
pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub primary: Arc<MockPriceSource>,
    pub secondary: Arc<MockPriceSource>,
    pub fundamentals: Arc<MockFundamentalsSource>,
    pub fetcher: Arc<SymbolFetcher>,
    pub batch: BatchOrchestrator,
}

impl Harness {
    pub fn new(primary: PriceBehavior, secondary: PriceBehavior) -> Self {
        Self::with_fundamentals(
            primary,
            secondary,
            MockFundamentalsSource::new(Fundamentals::new(Some(24.5), Some(61.2))),
        )
    }

    pub fn with_fundamentals(
        primary: PriceBehavior,
        secondary: PriceBehavior,
        fundamentals: Arc<MockFundamentalsSource>,
    ) -> Self {
        let clock = Arc::new(ManualClock::new());
        let primary = MockPriceSource::new("mock_primary", primary);
        let secondary = MockPriceSource::new("mock_secondary", secondary);
        let fetcher = Arc::new(
            SymbolFetcher::builder()
                .clock(clock.clone())
                .config(FetcherConfig::default().with_source_timeout(Duration::from_millis(100)))
                .primary(primary.clone())
                .secondary(secondary.clone())
                .fundamentals(fundamentals.clone())
                .build(),
        );

        Self {
            clock,
            primary,
            secondary,
            fundamentals,
            batch: BatchOrchestrator::new(fetcher.clone()),
            fetcher,
        }
    }

    pub fn upstream_calls(&self) -> usize {
        self.primary.calls() + self.secondary.calls() + self.fundamentals.calls()
    }
}

pub fn listing(symbol: &str, exchange: &str) -> Listing {
    Listing::parse(symbol, exchange).expect("valid listing")
}
