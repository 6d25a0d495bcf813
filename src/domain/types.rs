//! Shared domain types.
//!
//! Every stage of the pipeline consumes one of these values and produces the
//! next one; nothing here is mutated after it has been handed on.

use std::collections::BTreeSet;
use std::path::PathBuf;

use clap::ValueEnum;

/// SDMX dataflow holding the World Economic Outlook.
pub const DEFAULT_DATAFLOW: &str = "WEO";

pub const DEFAULT_COUNTRIES: [&str; 5] = ["USA", "BRA", "DEU", "ZAF", "IND"];

pub const DEFAULT_INDICATORS: [&str; 2] = ["PCPIPCH", "NGDP_RPCH"];

pub const DEFAULT_START_YEAR: i32 = 2015;
pub const DEFAULT_END_YEAR: i32 = 2024;

/// Retrieval-metadata attributes attached to every WEO series.
///
/// The normalizer drops these and fails if any of them disappears upstream.
pub const DEFAULT_METADATA_COLUMNS: [&str; 4] = [
    "LATEST_ACTUAL_ANNUAL_DATA",
    "OVERLAP",
    "METHODOLOGY_NOTES",
    "METHODOLOGY",
];

pub const DEFAULT_OUTPUT: &str = "IMF_analysis.xlsx";

pub const SHEET_NAME: &str = "Economic Indicators";

/// Wide-table column drawn as the multi-line time series.
pub const LINE_CHART_COLUMN: &str = "GDP_Growth";

/// Wide-table column ranked in the bar chart.
pub const BAR_CHART_COLUMN: &str = "Inflation";

/// How collisions on one (entity, period, indicator) cell are resolved while
/// pivoting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Arithmetic mean of the non-missing values (same rule as the summary).
    #[default]
    Mean,
    /// First non-missing value in input order.
    First,
    /// Refuse to pivot.
    Error,
}

/// One parameterized data query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub dataflow: String,
    pub countries: Vec<String>,
    pub indicators: Vec<String>,
    pub start_year: i32,
    pub end_year: i32,
}

impl Query {
    /// SDMX series key, e.g. `USA+BRA.PCPIPCH+NGDP_RPCH`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.countries.join("+"), self.indicators.join("+"))
    }
}

impl Default for Query {
    fn default() -> Self {
        Self {
            dataflow: DEFAULT_DATAFLOW.to_string(),
            countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            indicators: DEFAULT_INDICATORS.iter().map(|i| i.to_string()).collect(),
            start_year: DEFAULT_START_YEAR,
            end_year: DEFAULT_END_YEAR,
        }
    }
}

/// Observations exactly as delivered by the source.
///
/// Column names are the source's own (SDMX dimension and attribute ids plus
/// `value`); cells are kept as strings until the normalizer parses them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct non-empty values of one column (empty if the column is absent).
    pub fn distinct(&self, column: &str) -> BTreeSet<&str> {
        let Some(idx) = self.column_index(column) else {
            return BTreeSet::new();
        };
        self.rows
            .iter()
            .filter_map(|row| row.get(idx).and_then(|c| c.as_deref()))
            .collect()
    }
}

/// A normalized long-form observation (codes, not display names yet).
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub entity: String,
    pub indicator: String,
    pub period: String,
    pub value: Option<f64>,
}

/// One (entity, year) row of the wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    /// Display name (or the raw code when unmapped).
    pub entity: String,
    pub year: i32,
    /// One value per `WideTable::columns` entry.
    pub values: Vec<Option<f64>>,
}

/// Wide form: one row per (entity, year), one column per indicator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    pub columns: Vec<String>,
    pub rows: Vec<WideRow>,
}

impl WideTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Entities in first-seen order.
    pub fn entities(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !out.contains(&row.entity.as_str()) {
                out.push(&row.entity);
            }
        }
        out
    }

    /// `(min, max)` year present in the table.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.rows.iter().map(|r| r.year).min()?;
        let max = self.rows.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

/// One long-form cell recovered from the wide table.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub entity: String,
    pub year: i32,
    pub indicator: String,
    pub value: f64,
}

/// Per-entity averages.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub entity: String,
    /// Rounded means, aligned with `SummaryTable::header[1..]`.
    pub means: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryTable {
    /// `Country` followed by one presentation name per indicator column.
    pub header: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

/// Everything a single report run needs.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub query: Query,
    /// Overrides the SDMX endpoint (else `WEO_SDMX_BASE_URL`, else the IMF default).
    pub base_url: Option<String>,
    pub metadata_columns: Vec<String>,
    pub duplicates: DuplicatePolicy,
    /// Year ranked in the bar chart; the latest year in the data when `None`.
    pub target_year: Option<i32>,
    pub output: PathBuf,
    /// Optional export of the full wide table.
    pub wide_output: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            query: Query::default(),
            base_url: None,
            metadata_columns: DEFAULT_METADATA_COLUMNS.iter().map(|c| c.to_string()).collect(),
            duplicates: DuplicatePolicy::default(),
            target_year: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            wide_output: None,
        }
    }
}
