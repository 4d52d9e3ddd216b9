//! Upstream source adapters.
//!
//! | Adapter | Role | Upstream |
//! |---------|------|----------|
//! | [`YahooPageSource`] | primary price | scraped Yahoo quote page |
//! | [`YahooChartSource`] | secondary price | Yahoo chart API |
//! | [`GoogleFinanceSource`] | fundamentals | scraped Google Finance quote page |

use std::sync::LazyLock;

use regex::Regex;

mod google_finance;
mod yahoo;

pub use google_finance::GoogleFinanceSource;
pub use yahoo::{YahooChartSource, YahooPageSource};

/// Parses a scraped figure such as `3,890.50`, `$12.4` or `₹ 101.2`.
///
/// Dashes and empty cells are "no value", not zero.
fn parse_figure(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, '.' | '-' | '+' | 'e' | 'E'))
        .collect();
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][\w-]*)[^>]*?(/?)>").expect("tag pattern is valid")
});
static MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("markup pattern is valid"));

/// Descendant text of the first element whose opening tag matches `open`.
///
/// `open` must capture the element name as `tag`. Nested markup is stripped,
/// so `<b><span>3,890.50</span></b>` reads as `3,890.50`. An element left
/// unclosed runs to the end of `haystack`.
fn element_text(open: &Regex, haystack: &str) -> Option<String> {
    let captures = open.captures(haystack)?;
    let name = captures.name("tag")?.as_str();
    let content = &haystack[captures.get(0)?.end()..];

    let mut depth = 0usize;
    let mut content_end = content.len();
    for tag in TAG.captures_iter(content) {
        if !tag[2].eq_ignore_ascii_case(name) || !tag[3].is_empty() {
            continue;
        }
        if tag[1].is_empty() {
            depth += 1;
        } else if depth == 0 {
            content_end = tag.get(0).map_or(content_end, |closing| closing.start());
            break;
        } else {
            depth -= 1;
        }
    }

    let text = MARKUP.replace_all(&content[..content_end], "");
    Some(text.split_whitespace().collect::<Vec<_>>().join(" "))
}
