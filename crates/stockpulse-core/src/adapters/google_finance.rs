use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::{element_text, parse_figure};
use crate::domain::{Fundamentals, Listing};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::source::{FundamentalsFuture, FundamentalsSource, SourceError, SourceId};

const QUOTE_PAGE_BASE_URL: &str = "https://www.google.com/finance/quote";

const PE_RATIO_LABEL: &str = "P/E ratio";
const EPS_LABEL: &str = "EPS";

static STAT_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"class="[^"]*\bgyFHrc\b[^"]*""#).expect("row pattern is valid")
});
static STAT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?P<tag>[A-Za-z][\w-]*)[^>]*\bclass="[^"]*\bmfs7Fc\b[^"]*"[^>]*>"#)
        .expect("label pattern is valid")
});
static STAT_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?P<tag>[A-Za-z][\w-]*)[^>]*\bclass="[^"]*\bP6K39c\b[^"]*"[^>]*>"#)
        .expect("value pattern is valid")
});
static EPS_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?P<tag>[A-Za-z][\w-]*)[^>]*\bclass="[^"]*\bjNipjJ\b[^"]*"[^>]*>"#)
        .expect("eps pattern is valid")
});

/// Best-effort P/E ratio and EPS scraped from the Google Finance quote page.
///
/// Never fails outward. Upstream or parse problems are logged and reported
/// as [`Fundamentals::unavailable`]; a page missing one statistic yields
/// `None` for that field only.
#[derive(Clone)]
pub struct GoogleFinanceSource {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
}

impl Default for GoogleFinanceSource {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl GoogleFinanceSource {
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

    // Google keys quotes by raw exchange code, not the Yahoo suffix.
    fn quote_url(&self, listing: &Listing) -> String {
        format!(
            "{}/{}:{}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(listing.symbol.as_str()),
            urlencoding::encode(listing.exchange.as_str())
        )
    }

    async fn scrape_statistics(&self, listing: &Listing) -> Result<Fundamentals, SourceError> {
        let request = HttpRequest::get(self.quote_url(listing))
            .with_header("accept", "text/html")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|error| SourceError::transport(SourceId::GoogleFinance, &error))?;

        if !response.is_success() {
            return Err(SourceError::status(SourceId::GoogleFinance, response.status));
        }

        Ok(parse_key_statistics(&response.body))
    }

    async fn fundamentals_or_unavailable(&self, listing: &Listing) -> Fundamentals {
        match self.scrape_statistics(listing).await {
            Ok(fundamentals) => fundamentals,
            Err(error) => {
                tracing::warn!(%listing, code = error.code(), %error, "fundamentals unavailable");
                Fundamentals::unavailable()
            }
        }
    }
}

impl FundamentalsSource for GoogleFinanceSource {
    fn id(&self) -> SourceId {
        SourceId::GoogleFinance
    }

    fn fetch_fundamentals<'a>(&'a self, listing: &'a Listing) -> FundamentalsFuture<'a> {
        Box::pin(self.fundamentals_or_unavailable(listing))
    }
}

/// Scans the key-statistics rows; the last matching row wins.
fn parse_key_statistics(body: &str) -> Fundamentals {
    let starts: Vec<usize> = STAT_ROW.find_iter(body).map(|found| found.end()).collect();
    let mut fundamentals = Fundamentals::unavailable();

    for (index, start) in starts.iter().enumerate() {
        let end = starts.get(index + 1).copied().unwrap_or(body.len());
        let row = &body[*start..end];

        let Some(label) = element_text(&STAT_LABEL, row) else {
            continue;
        };

        if label.contains(PE_RATIO_LABEL) {
            if let Some(value) = element_text(&STAT_VALUE, row)
                .as_deref()
                .and_then(parse_figure)
            {
                fundamentals.pe_ratio = Some(value);
            }
        } else if label.contains(EPS_LABEL) {
            let value = element_text(&EPS_VALUE, row)
                .or_else(|| element_text(&STAT_VALUE, row))
                .as_deref()
                .and_then(parse_figure);
            if let Some(value) = value {
                fundamentals.earnings = Some(value);
            }
        }
    }

    fundamentals
}
