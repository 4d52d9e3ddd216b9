use thiserror::Error;

use crate::domain::Listing;
use crate::source::SourceError;

/// Validation and contract errors exposed by `stockpulse-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or digit: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("listing '{value}' must look like SYMBOL or SYMBOL:EXCHANGE")]
    InvalidListing { value: String },

    #[error("holding '{symbol}' has a negative {field}")]
    NegativeHoldingValue { symbol: String, field: &'static str },
}

/// Price lookup failure for a single listing.
///
/// Never crosses the batch boundary; the orchestrator turns it into a
/// `null` price.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("no price source could price {listing}: {secondary}")]
    BothSourcesUnavailable {
        listing: Listing,
        /// `None` when the failure tracker bypassed the primary source.
        primary: Option<SourceError>,
        secondary: SourceError,
    },

    #[error("fetch task for {listing} did not complete: {message}")]
    TaskFailed { listing: Listing, message: String },
}

impl FetchError {
    pub fn listing(&self) -> &Listing {
        match self {
            Self::BothSourcesUnavailable { listing, .. } | Self::TaskFailed { listing, .. } => {
                listing
            }
        }
    }
}

/// Invalid runtime configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {var} has invalid value '{value}': expected {expected}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
