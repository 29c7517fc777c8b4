use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::errors::LoadError;
use crate::model::{RawTable, RawValue};
use crate::registry::TableReader;

/// Reads spreadsheet workbooks (xlsx/xlsm/xls/ods) via calamine.
/// Only the first worksheet is consumed; the first row is the header.
pub struct XlsxReader;

impl TableReader for XlsxReader {
    fn name(&self) -> &'static str {
        "workbook"
    }

    fn read(&self, path: &Path) -> Result<RawTable, LoadError> {
        let mut workbook = open_workbook_auto(path).map_err(|source| LoadError::Workbook {
            path: path.to_path_buf(),
            source,
        })?;

        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::NoWorksheet {
                path: path.to_path_buf(),
            })?;

        let range =
            workbook
                .worksheet_range(&sheet_name)
                .map_err(|source| LoadError::Workbook {
                    path: path.to_path_buf(),
                    source,
                })?;

        let mut rows = range.rows();
        let header = rows.next().ok_or_else(|| LoadError::EmptyTable {
            path: path.to_path_buf(),
        })?;

        let columns = header
            .iter()
            .enumerate()
            .map(|(index, cell)| header_name(cell, index))
            .collect();

        let mut table = RawTable::new(columns);
        for row in rows {
            table.push_row(row.iter().map(convert_cell).collect());
        }
        Ok(table)
    }
}

fn header_name(cell: &Data, index: usize) -> String {
    match cell {
        Data::String(text) if !text.trim().is_empty() => text.trim().to_string(),
        Data::Empty => format!("column_{index}"),
        other => {
            let rendered = other.to_string();
            if rendered.trim().is_empty() {
                format!("column_{index}")
            } else {
                rendered.trim().to_string()
            }
        }
    }
}

fn convert_cell(cell: &Data) -> RawValue {
    match cell {
        Data::Empty | Data::Error(_) => RawValue::Empty,
        Data::Int(value) => RawValue::Number(*value as f64),
        Data::Float(value) => RawValue::Number(*value),
        Data::Bool(value) => RawValue::Bool(*value),
        Data::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                RawValue::Empty
            } else {
                RawValue::Text(trimmed.to_string())
            }
        }
        // Typed date cells pass through as datetimes; a cell whose
        // serial cannot be converted keeps its numeric form so the
        // pipeline's serial handling still applies.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => RawValue::DateTime(datetime),
            None => RawValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(text) | Data::DurationIso(text) => RawValue::Text(text.clone()),
    }
}
