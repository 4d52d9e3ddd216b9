use serde::Serialize;
use serde_json::json;
use stockpulse_core::{PortfolioReport, QuoteMap, SectorSummary};

use crate::cli::OutputFormat;
use crate::commands::CommandOutput;
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match (output, format) {
        (CommandOutput::Served, _) => {}
        (CommandOutput::Quotes(quotes), OutputFormat::Json) => {
            print_json(&json!({ "stockData": quotes }), pretty)?;
        }
        (CommandOutput::Portfolio(report), OutputFormat::Json) => print_json(report, pretty)?,
        (CommandOutput::Quotes(quotes), OutputFormat::Table) => {
            for line in quote_table(quotes) {
                println!("{line}");
            }
        }
        (CommandOutput::Portfolio(report), OutputFormat::Table) => {
            for line in portfolio_table(report) {
                println!("{line}");
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{payload}");
    Ok(())
}

fn quote_table(quotes: &QuoteMap) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<12} {:>12} {:>10} {:>10}",
        "symbol", "price", "pe_ratio", "eps"
    )];
    lines.extend(quotes.iter().map(|(symbol, quote)| {
        format!(
            "{:<12} {:>12} {:>10} {:>10}",
            symbol,
            figure(quote.current_price),
            figure(quote.pe_ratio),
            figure(quote.earnings)
        )
    }));
    lines
}

fn portfolio_table(report: &PortfolioReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{:<12} {:>8} {:>12} {:>12} {:>8} {:>12} {:>12} {:>12} {:>8} {:>8}",
        "symbol", "qty", "buy", "invested", "weight%", "price", "value", "gain", "gain%", "pe"
    )];
    lines.extend(report.holdings.iter().map(|row| {
        format!(
            "{:<12} {:>8} {:>12} {:>12} {:>8} {:>12} {:>12} {:>12} {:>8} {:>8}",
            row.symbol,
            row.quantity,
            figure(Some(row.purchase_price)),
            figure(Some(row.investment)),
            figure(Some(row.portfolio_percentage)),
            figure(row.current_price),
            figure(row.present_value),
            figure(row.gain_loss),
            figure(row.gain_loss_percentage),
            figure(row.pe_ratio)
        )
    }));

    lines.push(String::new());
    lines.push(format!(
        "{:<28} {:>8} {:>14} {:>14} {:>14} {:>8}",
        "sector", "weight%", "invested", "value", "gain", "gain%"
    ));
    lines.extend(
        report
            .sectors
            .iter()
            .map(|sector| summary_line(&sector.name, Some(sector.weight), &sector.summary)),
    );
    lines.push(summary_line("total", None, &report.total));
    lines
}

fn summary_line(name: &str, weight: Option<f64>, summary: &SectorSummary) -> String {
    format!(
        "{:<28} {:>8} {:>14} {:>14} {:>14} {:>8}",
        name,
        figure(weight),
        figure(Some(summary.total_investment)),
        figure(Some(summary.total_present_value)),
        figure(Some(summary.total_gain_loss)),
        figure(Some(summary.gain_loss_percentage))
    )
}

fn figure(value: Option<f64>) -> String {
    value.map_or_else(|| String::from("-"), |value| format!("{value:.2}"))
}
