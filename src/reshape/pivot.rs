use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{info, warn};

use crate::domain::labels::{country_name, indicator_column, is_known_country, is_known_indicator};
use crate::domain::{DuplicatePolicy, FlatRow, LongRecord, WideRow, WideTable};
use crate::error::AppError;

/// Pivot long rows into one row per (entity, year) and one column per indicator.
///
/// Rows are ordered by entity code, then year; columns by indicator code.
/// Entity codes become display names and indicator codes become column names
/// (unmapped codes pass through). Cells with more than one observation are
/// resolved by `policy`.
pub fn reshape(rows: &[FlatRow], policy: DuplicatePolicy) -> Result<WideTable, AppError> {
    let indicators: Vec<&str> = rows
        .iter()
        .map(|r| r.indicator.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells: BTreeMap<(&str, i32), HashMap<&str, Vec<Option<f64>>>> = BTreeMap::new();
    for row in rows {
        let year = parse_year(&row.period)?;
        cells
            .entry((row.entity.as_str(), year))
            .or_default()
            .entry(row.indicator.as_str())
            .or_default()
            .push(row.value);
    }

    let mut unmapped: BTreeSet<&str> = BTreeSet::new();
    let mut wide_rows = Vec::with_capacity(cells.len());
    for ((entity, year), by_indicator) in cells {
        let mut values = Vec::with_capacity(indicators.len());
        for &indicator in &indicators {
            let value = match by_indicator.get(indicator) {
                Some(observed) => resolve(observed, policy)
                    .map_err(|n| {
                        AppError::Shape(format!(
                            "{n} observations for {entity}/{year}/{indicator} and duplicate policy is 'error'"
                        ))
                    })?,
                None => None,
            };
            values.push(value);
        }

        if !is_known_country(entity) {
            unmapped.insert(entity);
        }
        wide_rows.push(WideRow {
            entity: country_name(entity).to_string(),
            year,
            values,
        });
    }

    if !unmapped.is_empty() {
        warn!(codes = ?unmapped, "no display name for entity code(s); keeping the code");
    }

    let unmapped_indicators: Vec<&str> = indicators
        .iter()
        .copied()
        .filter(|code| !is_known_indicator(code))
        .collect();
    if !unmapped_indicators.is_empty() {
        warn!(codes = ?unmapped_indicators, "no column name for indicator code(s); keeping the code");
    }

    let table = WideTable {
        columns: indicators.iter().map(|code| indicator_column(code).to_string()).collect(),
        rows: wide_rows,
    };
    info!(rows = table.rows.len(), columns = ?table.columns, "pivoted to wide form");
    Ok(table)
}

/// Collapse the observations of one cell. `Err(n)` when `policy` forbids duplicates.
fn resolve(observed: &[Option<f64>], policy: DuplicatePolicy) -> Result<Option<f64>, usize> {
    if let [single] = observed {
        return Ok(*single);
    }
    let present: Vec<f64> = observed.iter().flatten().copied().collect();
    match policy {
        DuplicatePolicy::Error => Err(observed.len()),
        DuplicatePolicy::First => Ok(present.first().copied()),
        DuplicatePolicy::Mean => Ok(mean(&present)),
    }
}

pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn parse_year(period: &str) -> Result<i32, AppError> {
    period
        .trim()
        .parse::<i32>()
        .map_err(|_| AppError::Shape(format!("period '{period}' is not an integer year")))
}

/// Back to long form; missing cells produce no record.
pub fn unpivot(table: &WideTable) -> Vec<LongRecord> {
    let mut out = Vec::new();
    for row in &table.rows {
        for (column, value) in table.columns.iter().zip(&row.values) {
            if let Some(value) = value {
                out.push(LongRecord {
                    entity: row.entity.clone(),
                    year: row.year,
                    indicator: column.clone(),
                    value: *value,
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(entity: &str, indicator: &str, period: &str, value: Option<f64>) -> FlatRow {
        FlatRow {
            entity: entity.to_string(),
            indicator: indicator.to_string(),
            period: period.to_string(),
            value,
        }
    }

    fn sorted(mut records: Vec<LongRecord>) -> Vec<LongRecord> {
        records.sort_by(|a, b| {
            (&a.entity, a.year, &a.indicator).cmp(&(&b.entity, b.year, &b.indicator))
        });
        records
    }

    fn long(entity: &str, year: i32, indicator: &str, value: f64) -> LongRecord {
        LongRecord {
            entity: entity.to_string(),
            year,
            indicator: indicator.to_string(),
            value,
        }
    }

    #[test]
    fn maps_labels_and_coerces_year() {
        let rows = vec![
            flat("USA", "NGDP_RPCH", "2024", Some(2.8)),
            flat("XXX", "NGDP_RPCH", "2024", Some(1.0)),
        ];
        let table = reshape(&rows, DuplicatePolicy::Mean).unwrap();

        assert_eq!(table.columns, vec!["GDP_Growth"]);
        assert_eq!(table.rows[0].entity, "United States");
        assert_eq!(table.rows[0].year, 2024);
        assert_eq!(table.rows[1].entity, "XXX");
    }

    #[test]
    fn unmapped_indicator_keeps_its_code_as_column() {
        let rows = vec![
            flat("DEU", "LUR", "2022", Some(3.1)),
            flat("DEU", "PCPIPCH", "2022", Some(8.7)),
        ];
        let table = reshape(&rows, DuplicatePolicy::Mean).unwrap();

        assert_eq!(table.columns, vec!["LUR", "Inflation"]);
        assert_eq!(table.rows[0].values, vec![Some(3.1), Some(8.7)]);
    }

    #[test]
    fn one_row_per_entity_and_year() {
        let rows = vec![
            flat("DEU", "PCPIPCH", "2016", Some(0.4)),
            flat("DEU", "NGDP_RPCH", "2015", Some(1.5)),
            flat("DEU", "PCPIPCH", "2015", Some(0.7)),
            flat("BRA", "NGDP_RPCH", "2015", Some(-3.5)),
        ];
        let table = reshape(&rows, DuplicatePolicy::Mean).unwrap();

        assert_eq!(table.columns, vec!["GDP_Growth", "Inflation"]);
        let keys: Vec<(&str, i32)> = table.rows.iter().map(|r| (r.entity.as_str(), r.year)).collect();
        assert_eq!(keys, vec![("Brazil", 2015), ("Germany", 2015), ("Germany", 2016)]);
        assert_eq!(table.rows[0].values, vec![Some(-3.5), None]);
        assert_eq!(table.rows[2].values, vec![None, Some(0.4)]);
    }

    #[test]
    fn round_trip_preserves_triples() {
        let rows = vec![
            flat("USA", "NGDP_RPCH", "2023", Some(2.9)),
            flat("USA", "PCPIPCH", "2023", Some(4.1)),
            flat("IND", "NGDP_RPCH", "2023", Some(8.2)),
            flat("IND", "PCPIPCH", "2023", None),
            flat("ZAF", "PCPIPCH", "2024", Some(4.4)),
        ];
        let table = reshape(&rows, DuplicatePolicy::Mean).unwrap();

        let expected = vec![
            long("United States", 2023, "GDP_Growth", 2.9),
            long("United States", 2023, "Inflation", 4.1),
            long("India", 2023, "GDP_Growth", 8.2),
            long("South Africa", 2024, "Inflation", 4.4),
        ];
        assert_eq!(sorted(unpivot(&table)), sorted(expected));
    }

    #[test]
    fn duplicates_follow_policy() {
        let rows = vec![
            flat("BRA", "PCPIPCH", "2020", Some(3.0)),
            flat("BRA", "PCPIPCH", "2020", None),
            flat("BRA", "PCPIPCH", "2020", Some(5.0)),
        ];

        let mean = reshape(&rows, DuplicatePolicy::Mean).unwrap();
        assert_eq!(mean.rows.len(), 1);
        assert_eq!(mean.rows[0].values, vec![Some(4.0)]);
        assert_eq!(unpivot(&mean), vec![long("Brazil", 2020, "Inflation", 4.0)]);

        let first = reshape(&rows, DuplicatePolicy::First).unwrap();
        assert_eq!(first.rows[0].values, vec![Some(3.0)]);

        let err = reshape(&rows, DuplicatePolicy::Error).unwrap_err();
        assert!(matches!(err, AppError::Shape(ref m) if m.contains("3 observations")));
    }

    #[test]
    fn non_integer_period_is_a_shape_error() {
        let rows = vec![flat("USA", "PCPIPCH", "2020-Q1", Some(1.0))];
        let err = reshape(&rows, DuplicatePolicy::Mean).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }
}
