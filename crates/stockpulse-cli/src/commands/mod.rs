mod portfolio;
mod quote;
mod serve;

use std::sync::Arc;
use std::time::Duration;

use stockpulse_core::{BatchOrchestrator, FetcherConfig, PortfolioReport, QuoteMap, SymbolFetcher};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command produced for rendering.
#[derive(Debug)]
pub enum CommandOutput {
    Quotes(QuoteMap),
    Portfolio(PortfolioReport),
    /// The server ran until shutdown; nothing to render.
    Served,
}

impl CommandOutput {
    /// Listings that came back without a price.
    pub fn unpriced(&self) -> usize {
        match self {
            Self::Quotes(quotes) => quotes
                .values()
                .filter(|quote| quote.current_price.is_none())
                .count(),
            Self::Portfolio(report) => report
                .holdings
                .iter()
                .filter(|row| row.current_price.is_none())
                .count(),
            Self::Served => 0,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let orchestrator = build_orchestrator(cli)?;

    match &cli.command {
        Command::Quote(args) => quote::run(args, &orchestrator).await,
        Command::Portfolio(args) => portfolio::run(args, &orchestrator).await,
        Command::Serve(args) => serve::run(args, orchestrator).await,
    }
}

fn build_orchestrator(cli: &Cli) -> Result<BatchOrchestrator, CliError> {
    let mut config = FetcherConfig::from_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_source_timeout(Duration::from_millis(timeout_ms));
    }

    let fetcher = SymbolFetcher::builder().config(config).build();
    Ok(BatchOrchestrator::new(Arc::new(fetcher)))
}
