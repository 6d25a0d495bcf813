//! The report pipeline, independent of where data comes from and where it goes.
//!
//! fetch -> normalize -> pivot -> summarize -> charts -> layout -> write
//!
//! Every fallible stage runs before the first file is written, so a failure
//! never leaves a half-built report behind.

use std::path::PathBuf;

use tracing::info;

use crate::data::{ObservationSource, normalize};
use crate::domain::{BAR_CHART_COLUMN, LINE_CHART_COLUMN, RawTable, ReportConfig, SummaryTable, WideTable};
use crate::error::AppError;
use crate::io::SpreadsheetWriter;
use crate::plot::{ChartBackend, ranked_bar_chart, time_series_chart};
use crate::report::{build_layout, summarize, wide_table_layout};
use crate::reshape::reshape;

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub wide: WideTable,
    pub summary: SummaryTable,
    /// Year ranked in the bar chart.
    pub target_year: i32,
    /// Report workbook written.
    pub path: PathBuf,
}

/// Fetch observations from `source` and build the report.
pub fn run_report(
    config: &ReportConfig,
    source: &impl ObservationSource,
    charts: &impl ChartBackend,
    writer: &impl SpreadsheetWriter,
) -> Result<RunOutput, AppError> {
    let raw = source.fetch(&config.query)?;
    run_report_with_table(config, &raw, charts, writer)
}

/// Build the report from already retrieved observations.
pub fn run_report_with_table(
    config: &ReportConfig,
    raw: &RawTable,
    charts: &impl ChartBackend,
    writer: &impl SpreadsheetWriter,
) -> Result<RunOutput, AppError> {
    let flat = normalize(raw, &config.metadata_columns)?;
    let wide = reshape(&flat, config.duplicates)?;
    let summary = summarize(&wide);

    let target_year = match config.target_year {
        Some(year) => year,
        None => wide
            .year_span()
            .map(|(_, last)| last)
            .ok_or_else(|| AppError::Shape("wide table has no rows".to_string()))?,
    };

    let line = time_series_chart(&wide, LINE_CHART_COLUMN)?;
    let bar = ranked_bar_chart(&wide, BAR_CHART_COLUMN, target_year)?;
    let images = vec![charts.render_line(&line)?, charts.render_bar(&bar)?];
    info!(target_year, "charts rendered");

    let layout = build_layout(&summary, images);
    let wide_export = config
        .wide_output
        .as_ref()
        .map(|path| (path, wide_table_layout(&wide)));

    // The report goes last: if it exists, every requested workbook was written.
    if let Some((path, wide_layout)) = wide_export {
        writer.save(&wide_layout, path)?;
    }
    writer.save(&layout, &config.output)?;

    Ok(RunOutput {
        wide,
        summary,
        target_year,
        path: config.output.clone(),
    })
}
