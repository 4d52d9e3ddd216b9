use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::failure_tracker::FailureTrackerConfig;

pub const PRICE_TTL_ENV: &str = "STOCKPULSE_PRICE_TTL_SECS";
pub const FUNDAMENTALS_TTL_ENV: &str = "STOCKPULSE_FUNDAMENTALS_TTL_SECS";
pub const SOURCE_TIMEOUT_ENV: &str = "STOCKPULSE_SOURCE_TIMEOUT_MS";
pub const FAILURE_THRESHOLD_ENV: &str = "STOCKPULSE_FAILURE_THRESHOLD";
pub const FAILURE_WINDOW_ENV: &str = "STOCKPULSE_FAILURE_WINDOW_SECS";

/// Tunables for the single-symbol fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    pub price_ttl: Duration,
    pub fundamentals_ttl: Duration,
    /// Upper bound on any single upstream call.
    pub source_timeout: Duration,
    pub failure_threshold: u32,
    pub failure_window: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        let tracker = FailureTrackerConfig::default();
        Self {
            price_ttl: Duration::from_secs(300),
            fundamentals_ttl: Duration::from_secs(300),
            source_timeout: Duration::from_secs(10),
            failure_threshold: tracker.failure_threshold,
            failure_window: tracker.failure_window,
        }
    }
}

impl FetcherConfig {
    /// Defaults overlaid with the `STOCKPULSE_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] when a variable is set but does not
    /// parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`FetcherConfig::from_env`] with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(secs) = read_var::<u64, _>(&lookup, PRICE_TTL_ENV, "whole seconds")? {
            config.price_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = read_var::<u64, _>(&lookup, FUNDAMENTALS_TTL_ENV, "whole seconds")? {
            config.fundamentals_ttl = Duration::from_secs(secs);
        }
        if let Some(ms) = read_var::<u64, _>(&lookup, SOURCE_TIMEOUT_ENV, "milliseconds > 0")? {
            if ms == 0 {
                return Err(invalid(SOURCE_TIMEOUT_ENV, "0", "milliseconds > 0"));
            }
            config.source_timeout = Duration::from_millis(ms);
        }
        if let Some(threshold) =
            read_var::<u32, _>(&lookup, FAILURE_THRESHOLD_ENV, "an integer > 0")?
        {
            if threshold == 0 {
                return Err(invalid(FAILURE_THRESHOLD_ENV, "0", "an integer > 0"));
            }
            config.failure_threshold = threshold;
        }
        if let Some(secs) = read_var::<u64, _>(&lookup, FAILURE_WINDOW_ENV, "whole seconds")? {
            config.failure_window = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn with_source_timeout(mut self, timeout: Duration) -> Self {
        self.source_timeout = timeout;
        self
    }

    pub const fn tracker_config(&self) -> FailureTrackerConfig {
        FailureTrackerConfig {
            failure_threshold: self.failure_threshold,
            failure_window: self.failure_window,
        }
    }
}

fn read_var<T, F>(
    lookup: &F,
    var: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| invalid(var, trimmed, expected))
}

fn invalid(var: &'static str, value: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidEnv {
        var,
        value: value.to_owned(),
        expected,
    }
}
