//! Behavior-driven tests for portfolio loading and valuation.

use std::io::Write;

use stockpulse_core::portfolio::summarize_holdings;
use stockpulse_core::{
    CoreError, Exchange, Fundamentals, Listing, Portfolio, QuoteMap, QuoteResult,
};

const PORTFOLIO_JSON: &str = r#"{
  "sectors": [
    {
      "name": "Technology Sector",
      "stocks": [
        {"symbol": "TCS", "name": "Tata Consultancy Services", "exchange": "NSE",
         "purchasePrice": 3500.0, "quantity": 10, "sector": "Technology", "currency": "INR"},
        {"symbol": "INFY", "name": "Infosys", "exchange": "BSE",
         "purchasePrice": 1500.0, "quantity": 20, "sector": "Technology", "currency": "INR"}
      ]
    },
    {
      "name": "Financial Sector",
      "stocks": [
        {"symbol": "HDFCBANK", "name": "HDFC Bank", "exchange": "NSE",
         "purchasePrice": 1000.0, "quantity": 20, "sector": "Financials"},
        {"symbol": "TCS", "name": "Tata Consultancy Services", "exchange": "NSE",
         "purchasePrice": 3600.0, "quantity": 5, "sector": "Technology"}
      ]
    }
  ]
}"#;

fn quotes() -> QuoteMap {
    let mut quotes = QuoteMap::new();
    quotes.insert(
        String::from("TCS"),
        QuoteResult::new("TCS", Some(3890.5), Fundamentals::new(Some(29.1), Some(133.5))),
    );
    quotes.insert(
        String::from("INFY"),
        QuoteResult::new("INFY", Some(1400.0), Fundamentals::unavailable()),
    );
    quotes.insert(String::from("HDFCBANK"), QuoteResult::unavailable("HDFCBANK"));
    quotes
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn when_portfolio_file_is_loaded_listings_are_unique_and_ordered() {
    // Given: A portfolio file holding TCS twice
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(PORTFOLIO_JSON.as_bytes()).expect("write portfolio");

    // When: It is loaded
    let portfolio = Portfolio::from_path(file.path()).expect("valid portfolio");

    // Then: Listings are deduplicated in first-seen order
    let listings: Vec<String> = portfolio
        .listings()
        .iter()
        .map(Listing::to_string)
        .collect();
    assert_eq!(listings, vec!["TCS:NSE", "INFY:BSE", "HDFCBANK:NSE"]);

    // And: Missing currency defaults to INR
    let hdfc = portfolio
        .holdings()
        .find(|holding| holding.symbol.as_str() == "HDFCBANK")
        .expect("holding present");
    assert_eq!(hdfc.currency, "INR");
    assert_eq!(hdfc.exchange, Exchange::Nse);
}

#[test]
fn when_portfolio_file_is_missing_an_io_error_is_returned() {
    let error = Portfolio::from_path("/definitely/not/here.json").expect_err("missing file");
    assert!(matches!(error, CoreError::Io(_)));
}

// =============================================================================
// Valuation
// =============================================================================

#[test]
fn when_quotes_are_known_each_holding_is_valued() {
    // Given: A portfolio and current quotes
    let portfolio = Portfolio::from_json_str(PORTFOLIO_JSON).expect("valid portfolio");

    // When: The report is built
    let report = portfolio.report(&quotes());

    // Then: TCS rows carry investment, weight and gain figures
    let tcs = &report.holdings[0];
    assert_eq!(tcs.investment, 35_000.0);
    // Total investment: 35,000 + 30,000 + 20,000 + 18,000 = 103,000
    assert_eq!(tcs.portfolio_percentage, 33.98);
    assert_eq!(tcs.present_value, Some(38_905.0));
    assert_eq!(tcs.gain_loss, Some(3_905.0));
    assert_eq!(tcs.gain_loss_percentage, Some(11.16));
    assert_eq!(tcs.pe_ratio, Some(29.1));
    assert_eq!(tcs.earnings, Some(133.5));

    // And: A loss is negative
    let infy = &report.holdings[1];
    assert_eq!(infy.gain_loss, Some(-2_000.0));
    assert_eq!(infy.gain_loss_percentage, Some(-6.67));
    assert_eq!(infy.pe_ratio, None);
}

#[test]
fn when_a_price_is_missing_the_holding_has_no_value_but_still_counts_as_invested() {
    // Given: HDFCBANK without a price
    let portfolio = Portfolio::from_json_str(PORTFOLIO_JSON).expect("valid portfolio");

    // When: The report is built
    let report = portfolio.report(&quotes());

    // Then: The row has null value fields
    let hdfc = &report.holdings[2];
    assert_eq!(hdfc.current_price, None);
    assert_eq!(hdfc.present_value, None);
    assert_eq!(hdfc.gain_loss, None);
    assert_eq!(hdfc.gain_loss_percentage, None);

    // And: The financial sector summary counts it as zero present value
    let financial = &report.sectors[1];
    assert_eq!(financial.name, "Financial Sector");
    assert_eq!(financial.summary.total_investment, 38_000.0);
    assert_eq!(financial.summary.total_present_value, 19_452.5);
    assert_eq!(financial.summary.total_gain_loss, -18_547.5);
    assert_eq!(financial.summary.gain_loss_percentage, -48.81);
    assert_eq!(financial.weight, 36.89);
}

#[test]
fn portfolio_total_sums_every_sector() {
    // Given: A portfolio and current quotes
    let portfolio = Portfolio::from_json_str(PORTFOLIO_JSON).expect("valid portfolio");

    // When: The portfolio summary is computed
    let total = portfolio.summary(&quotes());

    // Then: It matches the sum of the sectors
    assert_eq!(total.total_investment, 103_000.0);
    // 38,905 + 28,000 + 19,452.5
    assert_eq!(total.total_present_value, 86_357.5);
    assert_eq!(total.total_gain_loss, -16_642.5);
    assert_eq!(total.gain_loss_percentage, -16.16);
}

#[test]
fn empty_holdings_summarize_to_zero() {
    let summary = summarize_holdings(&[], &quotes());
    assert_eq!(summary.total_investment, 0.0);
    assert_eq!(summary.total_present_value, 0.0);
    assert_eq!(summary.gain_loss_percentage, 0.0);
}

#[test]
fn report_serializes_in_camel_case() {
    let portfolio = Portfolio::from_json_str(PORTFOLIO_JSON).expect("valid portfolio");
    let json = serde_json::to_value(portfolio.report(&quotes())).expect("serializable");

    assert_eq!(json["holdings"][0]["portfolioPercentage"], 33.98);
    assert_eq!(json["sectors"][0]["totalInvestment"], 65_000.0);
    assert!(json["holdings"][2]["presentValue"].is_null());
    assert_eq!(json["total"]["totalInvestment"], 103_000.0);
}
