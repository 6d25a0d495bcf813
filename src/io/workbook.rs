//! Persist a `ReportLayout` as an `.xlsx` workbook.

use std::path::Path;

use rust_xlsxwriter::{Format, Image, Workbook, XlsxError};
use tracing::info;

use crate::error::AppError;
use crate::report::layout::{CellValue, ReportLayout};

/// Spreadsheet seam: cells, images and widths in, one file out.
pub trait SpreadsheetWriter {
    fn save(&self, layout: &ReportLayout, path: &Path) -> Result<(), AppError>;
}

/// `rust_xlsxwriter`-backed writer. Existing files are overwritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWriter;

impl SpreadsheetWriter for XlsxWriter {
    fn save(&self, layout: &ReportLayout, path: &Path) -> Result<(), AppError> {
        let mut workbook = Workbook::new();
        write_sheet(&mut workbook, layout).map_err(|e| AppError::persist(path, e.to_string()))?;
        workbook
            .save(path)
            .map_err(|e| AppError::persist(path, e.to_string()))?;

        info!(
            path = %path.display(),
            cells = layout.cells.len(),
            images = layout.images.len(),
            "workbook written"
        );
        Ok(())
    }
}

fn write_sheet(workbook: &mut Workbook, layout: &ReportLayout) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&layout.sheet_name)?;

    for cell in &layout.cells {
        match (&cell.value, cell.bold) {
            (CellValue::Text(text), true) => {
                sheet.write_string_with_format(cell.row, cell.col, text, &bold)?;
            }
            (CellValue::Text(text), false) => {
                sheet.write_string(cell.row, cell.col, text)?;
            }
            (CellValue::Number(value), true) => {
                sheet.write_number_with_format(cell.row, cell.col, *value, &bold)?;
            }
            (CellValue::Number(value), false) => {
                sheet.write_number(cell.row, cell.col, *value)?;
            }
            (CellValue::Empty, _) => {}
        }
    }

    for placement in &layout.images {
        let image = Image::new_from_buffer(&placement.image.png)?.set_scale_to_size(
            placement.display_width,
            placement.display_height,
            false,
        );
        sheet.insert_image(placement.row, placement.col, &image)?;
    }

    for &(col, width) in &layout.column_widths {
        sheet.set_column_width(col, width)?;
    }

    Ok(())
}
