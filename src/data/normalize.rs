//! Raw observations -> flat long-form rows.

use tracing::{debug, info};

use crate::domain::{FlatRow, RawTable};
use crate::error::AppError;

/// Lower-cased names of the columns the reshaper needs.
const ENTITY_FIELD: &str = "country";
const INDICATOR_FIELD: &str = "indicator";
const PERIOD_FIELD: &str = "time_period";
const VALUE_FIELD: &str = "value";

/// Drop the metadata columns, lower-case the remaining names, and project
/// every row onto `{entity, indicator, period, value}`.
///
/// A listed metadata column that is not present means the source schema has
/// drifted; that is reported instead of silently keeping unknown columns.
pub fn normalize(raw: &RawTable, metadata_columns: &[String]) -> Result<Vec<FlatRow>, AppError> {
    let missing: Vec<&str> = metadata_columns
        .iter()
        .map(String::as_str)
        .filter(|name| raw.column_index(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Shape(format!(
            "metadata column(s) not found in source data: {}",
            missing.join(", ")
        )));
    }

    let kept: Vec<(usize, String)> = raw
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !metadata_columns.contains(*name))
        .map(|(idx, name)| (idx, name.to_lowercase()))
        .collect();

    let field = |name: &str| -> Result<usize, AppError> {
        kept.iter()
            .find(|(_, lower)| lower == name)
            .map(|(idx, _)| *idx)
            .ok_or_else(|| AppError::Shape(format!("expected column '{name}' is missing")))
    };
    let entity_idx = field(ENTITY_FIELD)?;
    let indicator_idx = field(INDICATOR_FIELD)?;
    let period_idx = field(PERIOD_FIELD)?;
    let value_idx = field(VALUE_FIELD)?;

    let ignored: Vec<&str> = kept
        .iter()
        .map(|(_, lower)| lower.as_str())
        .filter(|lower| ![ENTITY_FIELD, INDICATOR_FIELD, PERIOD_FIELD, VALUE_FIELD].contains(lower))
        .collect();
    if !ignored.is_empty() {
        debug!(?ignored, "columns not used downstream");
    }

    let mut out = Vec::with_capacity(raw.len());
    for (line, row) in raw.rows.iter().enumerate() {
        let cell = |idx: usize, name: &str| -> Result<String, AppError> {
            row.get(idx)
                .and_then(|c| c.clone())
                .ok_or_else(|| AppError::Shape(format!("row {line}: '{name}' is empty")))
        };
        let value = row.get(value_idx).and_then(|c| c.as_deref());
        out.push(FlatRow {
            entity: cell(entity_idx, ENTITY_FIELD)?,
            indicator: cell(indicator_idx, INDICATOR_FIELD)?,
            period: cell(period_idx, PERIOD_FIELD)?,
            value: parse_value(value)
                .map_err(|raw| AppError::Shape(format!("row {line}: invalid value '{raw}'")))?,
        });
    }

    info!(rows = out.len(), "normalized observations");
    Ok(out)
}

/// `Ok(None)` for missing markers, `Err(raw)` for anything non-numeric.
fn parse_value(raw: Option<&str>) -> Result<Option<f64>, String> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sdmx::parse_structure_specific;
    use crate::data::sdmx::tests::FIXTURE;
    use crate::domain::DEFAULT_METADATA_COLUMNS;

    fn metadata() -> Vec<String> {
        DEFAULT_METADATA_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn keeps_rows_and_values() {
        let raw = parse_structure_specific(FIXTURE).unwrap();
        let rows = normalize(&raw, &metadata()).unwrap();

        assert_eq!(rows.len(), raw.len());
        assert_eq!(
            rows[0],
            FlatRow {
                entity: "USA".to_string(),
                indicator: "NGDP_RPCH".to_string(),
                period: "2023".to_string(),
                value: Some(2.9),
            }
        );
        assert_eq!(rows[3].value, None);
    }

    #[test]
    fn missing_metadata_column_is_a_shape_error() {
        let mut raw = parse_structure_specific(FIXTURE).unwrap();
        let idx = raw.column_index("OVERLAP").unwrap();
        raw.columns.remove(idx);
        for row in &mut raw.rows {
            row.remove(idx);
        }

        let err = normalize(&raw, &metadata()).unwrap_err();
        assert!(matches!(err, AppError::Shape(ref m) if m.contains("OVERLAP")), "{err}");
    }

    #[test]
    fn missing_required_field_is_a_shape_error() {
        let raw = RawTable {
            columns: vec!["COUNTRY".into(), "INDICATOR".into(), "value".into()],
            rows: vec![vec![Some("USA".into()), Some("PCPIPCH".into()), Some("1.0".into())]],
        };
        let err = normalize(&raw, &[]).unwrap_err();
        assert!(matches!(err, AppError::Shape(ref m) if m.contains("time_period")));
    }

    #[test]
    fn non_numeric_value_is_rejected() {
        let raw = RawTable {
            columns: vec!["COUNTRY".into(), "INDICATOR".into(), "TIME_PERIOD".into(), "value".into()],
            rows: vec![vec![
                Some("USA".into()),
                Some("PCPIPCH".into()),
                Some("2020".into()),
                Some("n/a%".into()),
            ]],
        };
        assert!(normalize(&raw, &[]).is_err());
    }

    #[test]
    fn parse_value_missing_markers() {
        assert_eq!(parse_value(None), Ok(None));
        assert_eq!(parse_value(Some(" ")), Ok(None));
        assert_eq!(parse_value(Some("NaN")), Ok(None));
        assert_eq!(parse_value(Some("-0.5")), Ok(Some(-0.5)));
    }
}
