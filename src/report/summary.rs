//! Per-entity averages of the wide table.

use std::collections::BTreeMap;

use tracing::info;

use crate::domain::labels::summary_header;
use crate::domain::{SummaryRow, SummaryTable, WideTable};
use crate::reshape::pivot::mean;

pub const ENTITY_HEADER: &str = "Country";

/// Decimal places kept in the summary.
pub const SUMMARY_DECIMALS: i32 = 2;

/// Mean of every column per entity, rounded half-to-even.
///
/// Missing cells are left out of the mean; an entity with no value at all for
/// a column gets `None` for it but still gets a row. Rows are ordered by
/// entity name.
pub fn summarize(table: &WideTable) -> SummaryTable {
    let width = table.columns.len();
    let mut groups: BTreeMap<&str, Vec<Vec<f64>>> = BTreeMap::new();
    for row in &table.rows {
        let columns = groups
            .entry(row.entity.as_str())
            .or_insert_with(|| vec![Vec::new(); width]);
        for (values, value) in columns.iter_mut().zip(&row.values) {
            if let Some(value) = value {
                values.push(*value);
            }
        }
    }

    let rows: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(entity, columns)| SummaryRow {
            entity: entity.to_string(),
            means: columns
                .iter()
                .map(|values| mean(values).map(|m| round_half_even(m, SUMMARY_DECIMALS)))
                .collect(),
        })
        .collect();

    let mut header = Vec::with_capacity(width + 1);
    header.push(ENTITY_HEADER.to_string());
    header.extend(table.columns.iter().map(|c| summary_header(c)));

    info!(entities = rows.len(), "summarized wide table");
    SummaryTable { header, rows }
}

/// Round to `decimals` places, ties to the even neighbour (banker's rounding).
///
/// The value is scaled by `10^decimals` first and the product is rounded, so a
/// tie is judged on the scaled float: `0.015 * 100` is exactly `1.5` and rounds
/// to 0.02, while `1.005 * 100` lands below `100.5` and rounds to 1.0.
pub fn round_half_even(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WideRow;

    fn row(entity: &str, year: i32, values: &[Option<f64>]) -> WideRow {
        WideRow {
            entity: entity.to_string(),
            year,
            values: values.to_vec(),
        }
    }

    fn wide(rows: Vec<WideRow>) -> WideTable {
        WideTable {
            columns: vec!["GDP_Growth".to_string(), "Inflation".to_string()],
            rows,
        }
    }

    #[test]
    fn mean_of_three_periods() {
        let table = wide(vec![
            row("Synthetic", 2020, &[Some(2.0), Some(1.0)]),
            row("Synthetic", 2021, &[Some(4.0), Some(1.0)]),
            row("Synthetic", 2022, &[Some(6.0), Some(1.0)]),
        ]);
        let summary = summarize(&table);
        assert_eq!(summary.rows.len(), 1);
        assert_eq!(summary.rows[0].means, vec![Some(4.0), Some(1.0)]);
    }

    #[test]
    fn header_uses_presentation_names() {
        let summary = summarize(&wide(vec![row("India", 2020, &[Some(1.0), None])]));
        assert_eq!(
            summary.header,
            vec!["Country", "Avg GDP Growth (%)", "Avg Inflation (%)"]
        );
    }

    #[test]
    fn every_entity_is_kept_and_missing_values_are_skipped() {
        let table = wide(vec![
            row("Germany", 2020, &[Some(-3.8), None]),
            row("Germany", 2021, &[Some(3.2), Some(3.1)]),
            row("Brazil", 2020, &[None, None]),
            row("United States", 2020, &[Some(-2.2), Some(1.2)]),
        ]);
        let summary = summarize(&table);

        let entities: Vec<&str> = summary.rows.iter().map(|r| r.entity.as_str()).collect();
        assert_eq!(entities, vec!["Brazil", "Germany", "United States"]);
        assert_eq!(summary.rows[0].means, vec![None, None]);
        assert_eq!(summary.rows[1].means, vec![Some(-0.3), Some(3.1)]);
    }

    #[test]
    fn rounding_is_half_to_even() {
        assert_eq!(round_half_even(0.125, 2), 0.12);
        assert_eq!(round_half_even(0.375, 2), 0.38);
        assert_eq!(round_half_even(-0.125, 2), -0.12);
        assert_eq!(round_half_even(2.5, 0), 2.0);
        assert_eq!(round_half_even(1.23456, 2), 1.23);
        assert_eq!(round_half_even(0.015, 2), 0.02);
        assert_eq!(round_half_even(1.005, 2), 1.0);
    }
}
