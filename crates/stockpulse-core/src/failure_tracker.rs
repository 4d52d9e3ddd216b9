//! Per-listing failure tracking for the primary price source.
//!
//! Only listings with an active failure streak hold a record; a success or a
//! lapsed window drops it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::domain::Listing;

/// Routing state of the primary price source for one listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Primary source is tried first.
    Closed,
    /// Primary source is skipped until the failure window lapses.
    Open,
}

/// Failure tracker thresholds and timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureTrackerConfig {
    pub failure_threshold: u32,
    pub failure_window: Duration,
}

impl Default for FailureTrackerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            failure_window: Duration::from_secs(5 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct FailureRecord {
    consecutive_failures: u32,
    window_start: Instant,
}

impl FailureRecord {
    fn started(now: Instant) -> Self {
        Self {
            consecutive_failures: 0,
            window_start: now,
        }
    }
}

/// Per-listing consecutive-failure counter for the primary price source.
///
/// Opens after `failure_threshold` failures. There is no half-open state: once
/// `failure_window` has passed since the first failure of the streak, the
/// next bypass check drops the record and the primary is tried again.
pub struct FailureTracker {
    config: FailureTrackerConfig,
    records: Mutex<HashMap<Listing, FailureRecord>>,
    clock: Arc<dyn Clock>,
}

impl Default for FailureTracker {
    fn default() -> Self {
        Self::new(FailureTrackerConfig::default(), Arc::new(SystemClock))
    }
}

impl FailureTracker {
    pub fn new(config: FailureTrackerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub const fn config(&self) -> FailureTrackerConfig {
        self.config
    }

    /// True when the primary source should be skipped for `listing`.
    ///
    /// A record whose window has lapsed is dropped first, so this returns
    /// `false` for it even without an intervening success.
    pub fn should_bypass_primary(&self, listing: &Listing) -> bool {
        let now = self.clock.now();
        let mut records = self.lock();
        let Some(record) = records.get(listing).copied() else {
            return false;
        };

        if now.saturating_duration_since(record.window_start) > self.config.failure_window {
            records.remove(listing);
            tracing::debug!(%listing, "failure window lapsed; primary source re-enabled");
            return false;
        }

        record.consecutive_failures >= self.config.failure_threshold
    }

    /// Counts one primary-source failure.
    ///
    /// Only the transition out of zero stamps a new window, so the window
    /// runs from the first failure of a streak.
    pub fn record_failure(&self, listing: &Listing) {
        let now = self.clock.now();
        let mut records = self.lock();
        let record = records
            .entry(listing.clone())
            .or_insert_with(|| FailureRecord::started(now));

        if record.consecutive_failures == 0 {
            record.window_start = now;
        }
        record.consecutive_failures = record.consecutive_failures.saturating_add(1);

        if record.consecutive_failures == self.config.failure_threshold {
            tracing::warn!(
                %listing,
                failures = record.consecutive_failures,
                "primary price source bypassed after consecutive failures"
            );
        }
    }

    /// Clears the streak after a primary-source success.
    pub fn record_success(&self, listing: &Listing) {
        self.lock().remove(listing);
    }

    pub fn consecutive_failures(&self, listing: &Listing) -> u32 {
        self.lock()
            .get(listing)
            .map(|record| record.consecutive_failures)
            .unwrap_or(0)
    }

    /// Current routing state, without the window reset side effect.
    pub fn state(&self, listing: &Listing) -> CircuitState {
        let now = self.clock.now();
        let open = self.lock().get(listing).is_some_and(|record| {
            record.consecutive_failures >= self.config.failure_threshold
                && now.saturating_duration_since(record.window_start) <= self.config.failure_window
        });
        if open {
            CircuitState::Open
        } else {
            CircuitState::Closed
        }
    }

    /// Number of listings with an active failure streak.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn reset_all(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Listing, FailureRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    const HOUR: Duration = Duration::from_secs(60 * 60);

    fn tracker() -> (FailureTracker, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (
            FailureTracker::new(FailureTrackerConfig::default(), clock.clone()),
            clock,
        )
    }

    fn tcs() -> Listing {
        Listing::parse("TCS", "NSE").expect("valid listing")
    }

    #[test]
    fn opens_after_threshold_failures() {
        let (tracker, _clock) = tracker();
        let listing = tcs();

        for _ in 0..4 {
            tracker.record_failure(&listing);
            assert!(!tracker.should_bypass_primary(&listing));
        }
        tracker.record_failure(&listing);

        assert!(tracker.should_bypass_primary(&listing));
        assert_eq!(tracker.state(&listing), CircuitState::Open);
        assert_eq!(tracker.consecutive_failures(&listing), 5);
    }

    #[test]
    fn success_closes_the_breaker() {
        let (tracker, _clock) = tracker();
        let listing = tcs();
        for _ in 0..5 {
            tracker.record_failure(&listing);
        }

        tracker.record_success(&listing);

        assert!(!tracker.should_bypass_primary(&listing));
        assert_eq!(tracker.consecutive_failures(&listing), 0);
        assert_eq!(tracker.state(&listing), CircuitState::Closed);
    }

    #[test]
    fn successes_do_not_grow_the_tracked_set() {
        let (tracker, _clock) = tracker();
        for symbol in ["TCS", "INFY", "WIPRO", "HDFCBANK"] {
            tracker.record_success(&Listing::parse(symbol, "NSE").expect("valid"));
        }
        assert!(tracker.is_empty());

        let listing = tcs();
        tracker.record_failure(&listing);
        tracker.record_failure(&listing);
        assert_eq!(tracker.len(), 1);

        tracker.record_success(&listing);
        assert!(tracker.is_empty());
        assert_eq!(tracker.consecutive_failures(&listing), 0);
    }

    #[test]
    fn lapsed_window_resets_without_success() {
        let (tracker, clock) = tracker();
        let listing = tcs();
        for _ in 0..5 {
            tracker.record_failure(&listing);
        }

        clock.advance(5 * HOUR + Duration::from_secs(1));

        assert!(!tracker.should_bypass_primary(&listing));
        assert_eq!(tracker.consecutive_failures(&listing), 0);
        assert!(tracker.is_empty());

        tracker.record_failure(&listing);
        assert_eq!(tracker.consecutive_failures(&listing), 1);
        assert!(!tracker.should_bypass_primary(&listing));
    }

    #[test]
    fn window_runs_from_first_failure_of_streak() {
        let (tracker, clock) = tracker();
        let listing = tcs();

        tracker.record_failure(&listing);
        clock.advance(4 * HOUR);
        for _ in 0..4 {
            tracker.record_failure(&listing);
        }
        assert!(tracker.should_bypass_primary(&listing));

        // Later failures did not push the window forward.
        clock.advance(HOUR + Duration::from_secs(1));
        assert!(!tracker.should_bypass_primary(&listing));
    }

    #[test]
    fn window_boundary_is_exclusive() {
        let (tracker, clock) = tracker();
        let listing = tcs();
        for _ in 0..5 {
            tracker.record_failure(&listing);
        }

        clock.advance(5 * HOUR);
        assert!(tracker.should_bypass_primary(&listing));
    }

    #[test]
    fn listings_on_different_exchanges_are_tracked_separately() {
        let (tracker, _clock) = tracker();
        let nse = Listing::parse("RELIANCE", "NSE").expect("valid");
        let bse = Listing::parse("RELIANCE", "BSE").expect("valid");
        for _ in 0..5 {
            tracker.record_failure(&nse);
        }

        assert!(tracker.should_bypass_primary(&nse));
        assert!(!tracker.should_bypass_primary(&bse));
    }

    #[test]
    fn unknown_listing_is_not_bypassed() {
        let (tracker, _clock) = tracker();
        assert!(!tracker.should_bypass_primary(&tcs()));
        assert_eq!(tracker.state(&tcs()), CircuitState::Closed);
    }
}
