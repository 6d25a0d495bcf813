//! Sheet layout of the report, computed as plain data.
//!
//! Rows and columns are 0-based (row 0 is the spreadsheet's row 1).

use crate::domain::{SHEET_NAME, SummaryTable, WideTable};
use crate::plot::RenderedImage;

/// Size at which charts are shown in the sheet, in pixels.
pub const IMAGE_DISPLAY_SIZE: (u32, u32) = (600, 400);

/// Default spreadsheet row height in pixels (15pt).
pub const DEFAULT_ROW_HEIGHT_PX: u32 = 20;

/// Empty rows between the table and the first chart.
pub const GAP_AFTER_TABLE: u32 = 1;

/// Empty rows between consecutive charts.
pub const GAP_BETWEEN_CHARTS: u32 = 2;

/// Extra characters added to the widest cell of each column.
pub const COLUMN_PADDING: f64 = 2.0;

pub const HEADER_ROWS: u32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    /// Characters the value takes when displayed.
    pub fn display_len(&self) -> usize {
        match self {
            CellValue::Text(text) => text.chars().count(),
            CellValue::Number(value) => value.to_string().len(),
            CellValue::Empty => 0,
        }
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(CellValue::Empty, CellValue::Number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellWrite {
    pub row: u32,
    pub col: u16,
    pub value: CellValue,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub row: u32,
    pub col: u16,
    pub image: RenderedImage,
    pub display_width: u32,
    pub display_height: u32,
}

impl ImagePlacement {
    /// Rows covered by the image at default row height.
    pub fn rows_spanned(&self) -> u32 {
        self.display_height.div_ceil(DEFAULT_ROW_HEIGHT_PX)
    }
}

/// Everything the spreadsheet writer has to put on one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    pub sheet_name: String,
    pub cells: Vec<CellWrite>,
    pub images: Vec<ImagePlacement>,
    /// `(column, width in characters)`.
    pub column_widths: Vec<(u16, f64)>,
}

impl ReportLayout {
    /// Rows occupied by cell data (header included).
    pub fn table_rows(&self) -> u32 {
        self.cells.iter().map(|c| c.row + 1).max().unwrap_or(0)
    }
}

/// Summary table at the top, charts stacked below it in column A.
pub fn build_layout(summary: &SummaryTable, charts: Vec<RenderedImage>) -> ReportLayout {
    let mut cells = table_cells(&summary.header);
    for (i, row) in summary.rows.iter().enumerate() {
        let r = HEADER_ROWS + i as u32;
        cells.push(CellWrite {
            row: r,
            col: 0,
            value: CellValue::Text(row.entity.clone()),
            bold: false,
        });
        for (j, mean) in row.means.iter().enumerate() {
            cells.push(CellWrite {
                row: r,
                col: (j + 1) as u16,
                value: CellValue::from(*mean),
                bold: false,
            });
        }
    }

    let (display_width, display_height) = IMAGE_DISPLAY_SIZE;
    let mut next_row = HEADER_ROWS + summary.rows.len() as u32 + GAP_AFTER_TABLE;
    let mut images = Vec::with_capacity(charts.len());
    for image in charts {
        let placement = ImagePlacement {
            row: next_row,
            col: 0,
            image,
            display_width,
            display_height,
        };
        next_row = placement.row + placement.rows_spanned() + GAP_BETWEEN_CHARTS;
        images.push(placement);
    }

    ReportLayout {
        sheet_name: SHEET_NAME.to_string(),
        column_widths: column_widths(&cells),
        cells,
        images,
    }
}

/// Plain dump of the wide table (`country`, `Year`, one column per indicator).
pub fn wide_table_layout(table: &WideTable) -> ReportLayout {
    let mut header = vec!["country".to_string(), "Year".to_string()];
    header.extend(table.columns.iter().cloned());

    let mut cells = table_cells(&header);
    for (i, row) in table.rows.iter().enumerate() {
        let r = HEADER_ROWS + i as u32;
        cells.push(CellWrite {
            row: r,
            col: 0,
            value: CellValue::Text(row.entity.clone()),
            bold: false,
        });
        cells.push(CellWrite {
            row: r,
            col: 1,
            value: CellValue::Number(f64::from(row.year)),
            bold: false,
        });
        for (j, value) in row.values.iter().enumerate() {
            cells.push(CellWrite {
                row: r,
                col: (j + 2) as u16,
                value: CellValue::from(*value),
                bold: false,
            });
        }
    }

    ReportLayout {
        sheet_name: "Sheet1".to_string(),
        column_widths: column_widths(&cells),
        cells,
        images: Vec::new(),
    }
}

fn table_cells(header: &[String]) -> Vec<CellWrite> {
    header
        .iter()
        .enumerate()
        .map(|(col, name)| CellWrite {
            row: 0,
            col: col as u16,
            value: CellValue::Text(name.clone()),
            bold: true,
        })
        .collect()
}

/// Widest cell per column plus padding.
fn column_widths(cells: &[CellWrite]) -> Vec<(u16, f64)> {
    let mut widths: Vec<(u16, usize)> = Vec::new();
    for cell in cells {
        let len = cell.value.display_len();
        match widths.iter_mut().find(|(col, _)| *col == cell.col) {
            Some((_, max)) => *max = (*max).max(len),
            None => widths.push((cell.col, len)),
        }
    }
    widths.sort_by_key(|(col, _)| *col);
    widths
        .into_iter()
        .map(|(col, len)| (col, len as f64 + COLUMN_PADDING))
        .collect()
}
