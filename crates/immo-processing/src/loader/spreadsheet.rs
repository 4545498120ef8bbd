//! Spreadsheet input (xls, xlsx, xlsb, ods) through calamine.

use super::string_frame;
use crate::error::{CleaningError, Result};
use calamine::{Data, Reader, open_workbook_auto};
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::debug;

/// Read the first sheet. The first row holds the column names; every cell is
/// kept as text and typed later by the corrector.
pub(crate) fn read_first_sheet(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| CleaningError::Spreadsheet(e.to_string()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| CleaningError::Spreadsheet("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| CleaningError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell_text(cell) {
            Some(name) => name,
            None => format!("column_{}", idx),
        })
        .collect();

    let mut columns: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (idx, column) in columns.iter_mut().enumerate() {
            column.push(row.get(idx).and_then(cell_text));
        }
    }

    debug!(
        "Sheet '{}': {} columns, {} rows",
        sheet_name,
        headers.len(),
        columns.first().map(Vec::len).unwrap_or(0)
    );

    string_frame(headers, columns)
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        other => Some(other.to_string()),
    }
}
