use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;

use super::{element_text, parse_figure};
use crate::domain::Listing;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::source::{PriceFuture, PriceSource, SourceError, SourceId};

const QUOTE_PAGE_BASE_URL: &str = "https://finance.yahoo.com/quote";
const CHART_API_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

static QSP_PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?P<tag>[A-Za-z][\w-]*)[^>]*\bdata-testid="qsp-price"[^>]*>"#)
        .expect("qsp-price pattern is valid")
});

// ============================================================================
// Quote page scraper (primary)
// ============================================================================

/// Primary price source: scrapes the price element of the Yahoo quote page.
///
/// Cheap and fast when it works, but the markup changes without notice, so
/// the fetcher tracks its failures per listing.
#[derive(Clone)]
pub struct YahooPageSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for YahooPageSource {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooPageSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: QUOTE_PAGE_BASE_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn quote_url(&self, listing: &Listing) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&listing.market_ticker())
        )
    }

    async fn scrape_price(&self, listing: &Listing) -> Result<f64, SourceError> {
        let request = HttpRequest::get(self.quote_url(listing))
            .with_header("accept", "text/html")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::transport(SourceId::YahooPage, &error))?;

        if !response.is_success() {
            return Err(SourceError::status(SourceId::YahooPage, response.status));
        }

        parse_quote_page(&response.body, listing)
    }
}

impl PriceSource for YahooPageSource {
    fn id(&self) -> SourceId {
        SourceId::YahooPage
    }

    fn fetch_price<'a>(&'a self, listing: &'a Listing) -> PriceFuture<'a> {
        Box::pin(self.scrape_price(listing))
    }
}

fn parse_quote_page(body: &str, listing: &Listing) -> Result<f64, SourceError> {
    let text = element_text(&QSP_PRICE, body).ok_or_else(|| {
        SourceError::parse(
            SourceId::YahooPage,
            format!("price element not found on quote page for {listing}"),
        )
    })?;

    parse_figure(&text).ok_or_else(|| {
        SourceError::parse(
            SourceId::YahooPage,
            format!("could not parse price '{text}' for {listing}"),
        )
    })
}

// ============================================================================
// Chart API (secondary)
// ============================================================================

/// Secondary price source: `regularMarketPrice` from the Yahoo chart API.
///
/// A response without a usable price is a failure, never a zero price.
#[derive(Clone)]
pub struct YahooChartSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for YahooChartSource {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl YahooChartSource {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: CHART_API_BASE_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, listing: &Listing) -> String {
        format!(
            "{}/{}?range=1d&interval=1d",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(&listing.market_ticker())
        )
    }

    async fn fetch_market_price(&self, listing: &Listing) -> Result<f64, SourceError> {
        let request = HttpRequest::get(self.chart_url(listing))
            .with_header("referer", "https://finance.yahoo.com/")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::transport(SourceId::YahooChart, &error))?;

        if !response.is_success() {
            return Err(SourceError::status(SourceId::YahooChart, response.status));
        }

        parse_chart_response(&response.body, listing)
    }
}

impl PriceSource for YahooChartSource {
    fn id(&self) -> SourceId {
        SourceId::YahooChart
    }

    fn fetch_price<'a>(&'a self, listing: &'a Listing) -> PriceFuture<'a> {
        Box::pin(self.fetch_market_price(listing))
    }
}

fn parse_chart_response(body: &str, listing: &Listing) -> Result<f64, SourceError> {
    let chart_response: YahooChartResponse = serde_json::from_str(body).map_err(|e| {
        SourceError::parse(
            SourceId::YahooChart,
            format!("failed to parse yahoo chart: {e}"),
        )
    })?;

    if let Some(error) = chart_response.chart.error {
        return Err(SourceError::parse(
            SourceId::YahooChart,
            format!(
                "yahoo chart API error for {listing}: {}",
                error.description.or(error.code).unwrap_or_default()
            ),
        ));
    }

    chart_response
        .chart
        .result
        .into_iter()
        .flatten()
        .find_map(|result| result.meta.regular_market_price)
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or_else(|| SourceError::missing_price(SourceId::YahooChart, listing))
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    meta: YahooChartMeta,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}
