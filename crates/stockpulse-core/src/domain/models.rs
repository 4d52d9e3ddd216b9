use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Valuation figures scraped for a listing.
///
/// `None` means "unavailable this round", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub earnings: Option<f64>,
}

impl Fundamentals {
    pub const fn new(pe_ratio: Option<f64>, earnings: Option<f64>) -> Self {
        Self { pe_ratio, earnings }
    }

    pub const fn unavailable() -> Self {
        Self::new(None, None)
    }

    pub const fn is_unavailable(&self) -> bool {
        self.pe_ratio.is_none() && self.earnings.is_none()
    }
}

/// Per-symbol entry of a batch response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResult {
    #[serde(skip)]
    pub symbol: String,
    pub current_price: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub earnings: Option<f64>,
}

impl QuoteResult {
    pub fn new(
        symbol: impl Into<String>,
        current_price: Option<f64>,
        fundamentals: Fundamentals,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            pe_ratio: fundamentals.pe_ratio,
            earnings: fundamentals.earnings,
        }
    }

    pub fn unavailable(symbol: impl Into<String>) -> Self {
        Self::new(symbol, None, Fundamentals::unavailable())
    }
}

/// Batch response keyed by ticker.
pub type QuoteMap = BTreeMap<String, QuoteResult>;
