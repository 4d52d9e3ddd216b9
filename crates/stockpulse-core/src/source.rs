//! Source contracts for price and fundamentals providers.
//!
//! | Trait | Failure behaviour |
//! |-------|-------------------|
//! | [`PriceSource`] | Returns [`SourceError`]; the fetcher falls back or reports the price missing |
//! | [`FundamentalsSource`] | Infallible; degrades to [`Fundamentals::unavailable`] |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::domain::{Fundamentals, Listing};
use crate::http_client::HttpError;

/// Identifier of an upstream source, used in logs and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    /// Scraped Yahoo quote page.
    YahooPage,
    /// Yahoo chart API.
    YahooChart,
    /// Scraped Google Finance quote page.
    GoogleFinance,
    /// Test doubles and custom sources.
    Custom(&'static str),
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::YahooPage => "yahoo_page",
            Self::YahooChart => "yahoo_chart",
            Self::GoogleFinance => "google_finance",
            Self::Custom(name) => name,
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single upstream call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Transport,
    Status,
    Parse,
    MissingPrice,
    Timeout,
}

/// A single upstream call failed (network error, non-2xx, unparseable payload
/// or timeout). Every kind means "source unavailable" to the fallback policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    source: SourceId,
    message: String,
}

impl SourceError {
    pub fn new(kind: SourceErrorKind, source: SourceId, message: impl Into<String>) -> Self {
        Self {
            kind,
            source,
            message: message.into(),
        }
    }

    pub fn transport(source: SourceId, error: &HttpError) -> Self {
        let kind = if error.timed_out() {
            SourceErrorKind::Timeout
        } else {
            SourceErrorKind::Transport
        };
        Self::new(kind, source, format!("{source} transport error: {}", error.message()))
    }

    pub fn status(source: SourceId, status: u16) -> Self {
        Self::new(
            SourceErrorKind::Status,
            source,
            format!("{source} upstream returned status {status}"),
        )
    }

    pub fn parse(source: SourceId, message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Parse, source, message)
    }

    pub fn missing_price(source: SourceId, listing: &Listing) -> Self {
        Self::new(
            SourceErrorKind::MissingPrice,
            source,
            format!("{source} returned no usable market price for {listing}"),
        )
    }

    pub fn timeout(source: SourceId, after_ms: u128) -> Self {
        Self::new(
            SourceErrorKind::Timeout,
            source,
            format!("{source} did not answer within {after_ms}ms"),
        )
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub const fn source_id(&self) -> SourceId {
        self.source
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Transport => "source.transport",
            SourceErrorKind::Status => "source.status",
            SourceErrorKind::Parse => "source.parse",
            SourceErrorKind::MissingPrice => "source.missing_price",
            SourceErrorKind::Timeout => "source.timeout",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

pub type PriceFuture<'a> = Pin<Box<dyn Future<Output = Result<f64, SourceError>> + Send + 'a>>;
pub type FundamentalsFuture<'a> = Pin<Box<dyn Future<Output = Fundamentals> + Send + 'a>>;

/// Single-listing price provider.
///
/// Implementations must be `Send + Sync`; one instance serves every
/// concurrent fetch.
pub trait PriceSource: Send + Sync {
    fn id(&self) -> SourceId;

    /// Fetches the current price for `listing`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the upstream cannot be reached, answers
    /// with a non-2xx status, or its payload holds no parseable price.
    fn fetch_price<'a>(&'a self, listing: &'a Listing) -> PriceFuture<'a>;
}

/// Best-effort P/E and EPS provider.
///
/// Never fails outward: internal errors are logged and reported as
/// [`Fundamentals::unavailable`].
pub trait FundamentalsSource: Send + Sync {
    fn id(&self) -> SourceId;

    fn fetch_fundamentals<'a>(&'a self, listing: &'a Listing) -> FundamentalsFuture<'a>;
}
