mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    let output = commands::run(&cli).await?;
    output::render(&output, cli.format, cli.pretty)?;

    // Some listings could not be priced.
    if output.unpriced() > 0 {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}

/// Logs go to stderr so stdout stays machine readable.
fn init_logging(level: Option<&str>) -> Result<(), CliError> {
    let filter = match level {
        Some(filter) => EnvFilter::try_new(filter).map_err(|error| CliError::LogFilter {
            filter: filter.to_owned(),
            message: error.to_string(),
        })?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
