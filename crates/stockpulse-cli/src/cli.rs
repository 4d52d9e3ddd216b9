//! CLI argument definitions for stockpulse.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Fetch price, P/E and EPS for listings |
//! | `portfolio` | Value a portfolio file against live quotes |
//! | `serve` | Expose the batch fetch over HTTP |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | env or `10000` | Per-source timeout in ms |
//! | `--log-level` | `RUST_LOG` or `warn` | Log filter written to stderr |
//!
//! # Examples
//!
//! ```bash
//! stockpulse quote TCS:NSE INFY:BSE --pretty
//! stockpulse portfolio holdings.json --format table
//! stockpulse serve --bind 127.0.0.1:3000
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stockpulse - cached multi-source stock quotes
///
/// Prices come from the Yahoo quote page with the Yahoo chart API as
/// fallback; P/E and EPS come from Google Finance.
#[derive(Debug, Parser)]
#[command(
    name = "stockpulse",
    author,
    version,
    about = "Cached multi-source stock quotes and portfolio valuation"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Upper bound on each upstream call, in milliseconds.
    ///
    /// Overrides STOCKPULSE_SOURCE_TIMEOUT_MS.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Log filter (e.g. `info`, `stockpulse_core=debug`). Defaults to RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text for terminal display.
    Table,
    /// Single JSON document.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch price, P/E ratio and EPS for one or more listings.
    ///
    /// # Examples
    ///
    ///   stockpulse quote TCS:NSE
    ///   stockpulse quote RELIANCE:BSE INFY:NSE AAPL
    Quote(QuoteArgs),

    /// Value a portfolio JSON file against live quotes.
    Portfolio(PortfolioArgs),

    /// Serve `POST /api/stocks` for batch quote lookups.
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Listings as SYMBOL or SYMBOL:EXCHANGE (e.g. TCS:NSE).
    #[arg(required = true, num_args = 1..)]
    pub listings: Vec<String>,
}

#[derive(Debug, Args)]
pub struct PortfolioArgs {
    /// Portfolio file: `{"sectors":[{"name":..,"stocks":[..]}]}`.
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    pub bind: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stockpulse",
            "quote",
            "TCS:NSE",
            "INFY",
            "--format",
            "table",
            "--timeout-ms",
            "2500",
        ])
        .expect("valid arguments");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.timeout_ms, Some(2500));
        match cli.command {
            Command::Quote(args) => assert_eq!(args.listings, vec!["TCS:NSE", "INFY"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn quote_requires_a_listing() {
        assert!(Cli::try_parse_from(["stockpulse", "quote"]).is_err());
    }

    #[test]
    fn serve_has_a_default_bind_address() {
        let cli = Cli::try_parse_from(["stockpulse", "serve"]).expect("valid arguments");
        match cli.command {
            Command::Serve(args) => assert_eq!(args.bind, "127.0.0.1:3000"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
