//! Top-level application orchestration.
//!
//! `src/main.rs` only sets up logging; this module parses the CLI, builds the
//! run configuration and drives the pipeline against the real SDMX source,
//! Plotters and the xlsx writer.

use clap::Parser;

use crate::cli::Cli;
use crate::data::SdmxClient;
use crate::domain::{DEFAULT_DATAFLOW, Query, ReportConfig};
use crate::error::AppError;
use crate::io::XlsxWriter;
use crate::plot::PlottersBackend;

pub mod pipeline;

/// Entry point for the `weo-report` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = report_config_from_args(&cli)?;

    let source = SdmxClient::from_env(config.base_url.clone());
    let output = pipeline::run_report(&config, &source, &PlottersBackend::default(), &XlsxWriter)?;

    println!("Exported to {}", output.path.display());
    Ok(())
}

pub fn report_config_from_args(cli: &Cli) -> Result<ReportConfig, AppError> {
    if cli.countries.is_empty() || cli.indicators.is_empty() {
        return Err(AppError::Config(
            "at least one country and one indicator are required".to_string(),
        ));
    }
    if cli.start_year > cli.end_year {
        return Err(AppError::Config(format!(
            "start year {} is after end year {}",
            cli.start_year, cli.end_year
        )));
    }
    if let Some(year) = cli.target_year {
        if !(cli.start_year..=cli.end_year).contains(&year) {
            return Err(AppError::Config(format!(
                "target year {year} is outside {}-{}",
                cli.start_year, cli.end_year
            )));
        }
    }

    Ok(ReportConfig {
        query: Query {
            dataflow: DEFAULT_DATAFLOW.to_string(),
            countries: normalize_codes(&cli.countries),
            indicators: normalize_codes(&cli.indicators),
            start_year: cli.start_year,
            end_year: cli.end_year,
        },
        base_url: cli.base_url.clone(),
        duplicates: cli.duplicates,
        target_year: cli.target_year,
        output: cli.output.clone(),
        wide_output: cli.wide_output.clone(),
        ..ReportConfig::default()
    })
}

fn normalize_codes(codes: &[String]) -> Vec<String> {
    codes
        .iter()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .collect()
}
