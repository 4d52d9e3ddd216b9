use stockpulse_core::{BatchOrchestrator, Listing};

use crate::cli::QuoteArgs;
use crate::error::CliError;

use super::CommandOutput;

pub async fn run(
    args: &QuoteArgs,
    orchestrator: &BatchOrchestrator,
) -> Result<CommandOutput, CliError> {
    let listings = args
        .listings
        .iter()
        .map(|raw| raw.parse::<Listing>())
        .collect::<Result<Vec<_>, _>>()?;

    let quotes = orchestrator.fetch_batch(&listings).await;
    Ok(CommandOutput::Quotes(quotes))
}
