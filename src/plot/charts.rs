//! Chart descriptions built from the wide table.
//!
//! These are plain data: ordering, labels and annotations are decided here so
//! they can be tested without a drawing backend.

use crate::domain::WideTable;
use crate::domain::labels::column_label;
use crate::error::AppError;

/// One line of the time-series chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    /// `(year, value)`, ascending by year.
    pub points: Vec<(i32, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Text printed above the bar.
    pub annotation: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Already in display order (descending by value).
    pub bars: Vec<Bar>,
}

fn column(table: &WideTable, name: &str) -> Result<usize, AppError> {
    table
        .column_index(name)
        .ok_or_else(|| AppError::Render(format!("column '{name}' is not in the wide table")))
}

/// One connected line per entity, years on the x axis.
///
/// Entities without a single value for `column_name` get no line.
pub fn time_series_chart(table: &WideTable, column_name: &str) -> Result<LineChart, AppError> {
    let idx = column(table, column_name)?;

    let series: Vec<Series> = table
        .entities()
        .into_iter()
        .map(|entity| {
            let mut points: Vec<(i32, f64)> = table
                .rows
                .iter()
                .filter(|row| row.entity == entity)
                .filter_map(|row| row.values.get(idx).copied().flatten().map(|v| (row.year, v)))
                .collect();
            points.sort_by_key(|(year, _)| *year);
            Series {
                name: entity.to_string(),
                points,
            }
        })
        .filter(|series| !series.points.is_empty())
        .collect();

    if series.is_empty() {
        return Err(AppError::Render(format!("no values to plot for '{column_name}'")));
    }

    let label = column_label(column_name);
    let title = match table.year_span() {
        Some((first, last)) => format!("{label} ({first}-{last})"),
        None => label.to_string(),
    };
    Ok(LineChart {
        title,
        x_label: "Year".to_string(),
        y_label: format!("{label} (%)"),
        series,
    })
}

/// Entities ranked by `column_name` for one year, largest first.
pub fn ranked_bar_chart(table: &WideTable, column_name: &str, year: i32) -> Result<BarChart, AppError> {
    let idx = column(table, column_name)?;

    let mut bars: Vec<Bar> = table
        .rows
        .iter()
        .filter(|row| row.year == year)
        .filter_map(|row| {
            row.values.get(idx).copied().flatten().map(|value| Bar {
                label: row.entity.clone(),
                value,
                annotation: format!("{value:.1}%"),
            })
        })
        .collect();
    if bars.is_empty() {
        return Err(AppError::Render(format!("no '{column_name}' values for {year}")));
    }
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));

    let label = column_label(column_name);
    Ok(BarChart {
        title: format!("{label} Rates in {year} by Country"),
        x_label: "Country".to_string(),
        y_label: format!("{label} (%)"),
        bars,
    })
}
