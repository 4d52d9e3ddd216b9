use stockpulse_core::{BatchOrchestrator, Portfolio};

use crate::cli::PortfolioArgs;
use crate::error::CliError;

use super::CommandOutput;

pub async fn run(
    args: &PortfolioArgs,
    orchestrator: &BatchOrchestrator,
) -> Result<CommandOutput, CliError> {
    let portfolio = Portfolio::from_path(&args.file)?;
    let listings = portfolio.listings();
    tracing::info!(
        file = %args.file.display(),
        listings = listings.len(),
        "valuing portfolio"
    );

    let quotes = orchestrator.fetch_batch(&listings).await;
    Ok(CommandOutput::Portfolio(portfolio.report(&quotes)))
}
