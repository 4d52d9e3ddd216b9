//! Portfolio holdings and their valuation against a [`QuoteMap`].
//!
//! Percentages are rounded to two decimals. A holding without a price has
//! no present value; in summaries it contributes zero.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Exchange, Listing, QuoteMap, Symbol};
use crate::error::{CoreError, ValidationError};

/// Holdings grouped by sector, as stored in a portfolio JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub sectors: Vec<Sector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub name: String,
    #[serde(default)]
    pub stocks: Vec<Holding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub symbol: Symbol,
    #[serde(default)]
    pub name: String,
    pub exchange: Exchange,
    pub purchase_price: f64,
    pub quantity: f64,
    #[serde(default)]
    pub sector: String,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    String::from("INR")
}

impl Holding {
    pub fn listing(&self) -> Listing {
        Listing::new(self.symbol.clone(), self.exchange.clone())
    }

    pub fn investment(&self) -> f64 {
        investment(self.purchase_price, self.quantity)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let negative = |field| ValidationError::NegativeHoldingValue {
            symbol: self.symbol.to_string(),
            field,
        };
        if !is_non_negative(self.purchase_price) {
            return Err(negative("purchase price"));
        }
        if !is_non_negative(self.quantity) {
            return Err(negative("quantity"));
        }
        Ok(())
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

impl Portfolio {
    /// Parses and validates a portfolio document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Serialization`] for malformed JSON or an invalid
    /// symbol, and [`CoreError::Validation`] for a negative price or quantity.
    pub fn from_json_str(json: &str) -> Result<Self, CoreError> {
        let portfolio: Self = serde_json::from_str(json)?;
        portfolio.holdings().try_for_each(Holding::validate)?;
        Ok(portfolio)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn holdings(&self) -> impl Iterator<Item = &Holding> {
        self.sectors.iter().flat_map(|sector| sector.stocks.iter())
    }

    /// Distinct listings in first-seen order.
    pub fn listings(&self) -> Vec<Listing> {
        let mut seen = HashSet::new();
        self.holdings()
            .map(Holding::listing)
            .filter(|listing| seen.insert(listing.clone()))
            .collect()
    }

    pub fn total_investment(&self) -> f64 {
        self.holdings().map(Holding::investment).sum()
    }

    pub fn summary(&self, quotes: &QuoteMap) -> SectorSummary {
        let holdings: Vec<Holding> = self.holdings().cloned().collect();
        summarize_holdings(&holdings, quotes)
    }

    /// Per-holding rows, per-sector summaries and the portfolio total.
    pub fn report(&self, quotes: &QuoteMap) -> PortfolioReport {
        let total_investment = self.total_investment();
        PortfolioReport {
            holdings: self
                .holdings()
                .map(|holding| HoldingRow::new(holding, quotes, total_investment))
                .collect(),
            sectors: self
                .sectors
                .iter()
                .map(|sector| {
                    let summary = summarize_holdings(&sector.stocks, quotes);
                    SectorReport {
                        name: sector.name.clone(),
                        weight: portfolio_percentage(summary.total_investment, total_investment),
                        summary,
                    }
                })
                .collect(),
            total: self.summary(quotes),
        }
    }
}

pub fn investment(purchase_price: f64, quantity: f64) -> f64 {
    purchase_price * quantity
}

/// Share of `total_investment`, in percent; 0 for an empty portfolio.
pub fn portfolio_percentage(investment: f64, total_investment: f64) -> f64 {
    if total_investment == 0.0 {
        return 0.0;
    }
    round2(investment / total_investment * 100.0)
}

/// `None` without a usable (non-zero) price.
pub fn present_value(current_price: Option<f64>, quantity: f64) -> Option<f64> {
    current_price
        .filter(|price| *price != 0.0)
        .map(|price| price * quantity)
}

pub fn gain_loss(present_value: Option<f64>, investment: f64) -> Option<f64> {
    present_value.map(|value| value - investment)
}

pub fn gain_loss_percentage(gain_loss: Option<f64>, investment: f64) -> Option<f64> {
    if investment == 0.0 {
        return None;
    }
    gain_loss.map(|amount| round2(amount / investment * 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate valuation of a group of holdings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorSummary {
    pub total_investment: f64,
    pub total_present_value: f64,
    pub total_gain_loss: f64,
    pub gain_loss_percentage: f64,
}

pub fn summarize_holdings(holdings: &[Holding], quotes: &QuoteMap) -> SectorSummary {
    let total_investment: f64 = holdings.iter().map(Holding::investment).sum();
    let total_present_value: f64 = holdings
        .iter()
        .filter_map(|holding| {
            let price = quotes
                .get(holding.symbol.as_str())
                .and_then(|quote| quote.current_price);
            present_value(price, holding.quantity)
        })
        .sum();
    let total_gain_loss = total_present_value - total_investment;

    SectorSummary {
        total_investment,
        total_present_value,
        total_gain_loss,
        gain_loss_percentage: if total_investment > 0.0 {
            round2(total_gain_loss / total_investment * 100.0)
        } else {
            0.0
        },
    }
}

/// One holding valued against the latest quotes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingRow {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub sector: String,
    pub purchase_price: f64,
    pub quantity: f64,
    pub investment: f64,
    pub portfolio_percentage: f64,
    pub current_price: Option<f64>,
    pub present_value: Option<f64>,
    pub gain_loss: Option<f64>,
    pub gain_loss_percentage: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub earnings: Option<f64>,
}

impl HoldingRow {
    pub fn new(holding: &Holding, quotes: &QuoteMap, total_investment: f64) -> Self {
        let quote = quotes.get(holding.symbol.as_str());
        let current_price = quote.and_then(|quote| quote.current_price);
        let investment = holding.investment();
        let present_value = present_value(current_price, holding.quantity);
        let gain_loss = gain_loss(present_value, investment);

        Self {
            symbol: holding.symbol.to_string(),
            name: holding.name.clone(),
            exchange: holding.exchange.to_string(),
            sector: holding.sector.clone(),
            purchase_price: holding.purchase_price,
            quantity: holding.quantity,
            investment,
            portfolio_percentage: portfolio_percentage(investment, total_investment),
            current_price,
            present_value,
            gain_loss,
            gain_loss_percentage: gain_loss_percentage(gain_loss, investment),
            pe_ratio: quote.and_then(|quote| quote.pe_ratio),
            earnings: quote.and_then(|quote| quote.earnings),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorReport {
    pub name: String,
    /// Share of the portfolio's total investment, in percent.
    pub weight: f64,
    #[serde(flatten)]
    pub summary: SectorSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub holdings: Vec<HoldingRow>,
    pub sectors: Vec<SectorReport>,
    pub total: SectorSummary,
}
