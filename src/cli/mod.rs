//! Command-line parsing for the WEO report generator.
//!
//! Every flag defaults to the standard report (five countries, GDP growth and
//! inflation, 2015-2024), so running the binary without arguments produces it.

use std::path::PathBuf;

use clap::Parser;

use crate::domain::{
    DEFAULT_COUNTRIES, DEFAULT_END_YEAR, DEFAULT_INDICATORS, DEFAULT_OUTPUT, DEFAULT_START_YEAR,
    DuplicatePolicy,
};

/// Top-level CLI.
#[derive(Debug, Parser, Clone)]
#[command(name = "weo-report", version, about = "IMF WEO indicators -> Excel summary report")]
pub struct Cli {
    /// Country codes to request (ISO3, comma-separated).
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_COUNTRIES.map(String::from))]
    pub countries: Vec<String>,

    /// Indicator codes to request (comma-separated).
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_INDICATORS.map(String::from))]
    pub indicators: Vec<String>,

    /// First year requested.
    #[arg(long, default_value_t = DEFAULT_START_YEAR)]
    pub start_year: i32,

    /// Last year requested.
    #[arg(long, default_value_t = DEFAULT_END_YEAR)]
    pub end_year: i32,

    /// Year ranked in the bar chart (defaults to the latest year returned).
    #[arg(long)]
    pub target_year: Option<i32>,

    /// Report workbook path (overwritten if it exists).
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Also write the full wide table to this workbook (written before the report).
    #[arg(long, value_name = "XLSX")]
    pub wide_output: Option<PathBuf>,

    /// How to resolve several observations for the same country/year/indicator.
    #[arg(long, value_enum, default_value_t = DuplicatePolicy::Mean)]
    pub duplicates: DuplicatePolicy,

    /// SDMX endpoint (overrides WEO_SDMX_BASE_URL).
    #[arg(long)]
    pub base_url: Option<String>,
}
