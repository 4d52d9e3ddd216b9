use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// Exchange code to market-suffix table used by the Yahoo sources.
///
/// Codes missing from the table map to the empty suffix.
const MARKET_SUFFIXES: [(&str, &str); 2] = [("NSE", "NS"), ("BSE", "BO")];

/// Exchange a ticker is listed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Exchange {
    Nse,
    Bse,
    /// Any other code, including the empty one.
    Other(String),
}

impl Exchange {
    pub fn parse(input: &str) -> Self {
        let code = input.trim().to_ascii_uppercase();
        match code.as_str() {
            "NSE" => Self::Nse,
            "BSE" => Self::Bse,
            _ => Self::Other(code),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Nse => "NSE",
            Self::Bse => "BSE",
            Self::Other(code) => code,
        }
    }

    /// Market suffix appended to the ticker, e.g. `NS` for `NSE`.
    pub fn market_suffix(&self) -> &'static str {
        MARKET_SUFFIXES
            .iter()
            .find(|(code, _)| *code == self.as_str())
            .map(|(_, suffix)| *suffix)
            .unwrap_or("")
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Exchange {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Exchange> for String {
    fn from(value: Exchange) -> Self {
        value.as_str().to_owned()
    }
}

/// Which payload a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Price,
    Fundamentals,
}

impl CacheKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Fundamentals => "financial",
        }
    }
}

/// A ticker scoped to its exchange.
///
/// The same ticker on two exchanges is two listings, with separate cache
/// entries and separate failure records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Listing {
    pub symbol: Symbol,
    pub exchange: Exchange,
}

impl Listing {
    pub fn new(symbol: Symbol, exchange: Exchange) -> Self {
        Self { symbol, exchange }
    }

    pub fn parse(symbol: &str, exchange: &str) -> Result<Self, ValidationError> {
        Ok(Self::new(Symbol::parse(symbol)?, Exchange::parse(exchange)))
    }

    /// Ticker as the Yahoo sources expect it: `TCS.NS`, or bare `AAPL`.
    pub fn market_ticker(&self) -> String {
        match self.exchange.market_suffix() {
            "" => self.symbol.as_str().to_owned(),
            suffix => format!("{}.{suffix}", self.symbol),
        }
    }

    pub fn cache_key(&self, kind: CacheKind) -> String {
        format!("{}_{}_{}", kind.as_str(), self.symbol, self.exchange)
    }
}

impl Display for Listing {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.exchange.as_str().is_empty() {
            write!(f, "{}", self.symbol)
        } else {
            write!(f, "{}:{}", self.symbol, self.exchange)
        }
    }
}

impl FromStr for Listing {
    type Err = ValidationError;

    /// Accepts `SYMBOL` or `SYMBOL:EXCHANGE`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split(':');
        let symbol = parts.next().unwrap_or_default();
        let exchange = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(ValidationError::InvalidListing {
                value: value.to_owned(),
            });
        }
        Self::parse(symbol, exchange)
    }
}
