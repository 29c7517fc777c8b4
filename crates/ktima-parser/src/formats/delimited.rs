use std::fs;
use std::path::Path;

use crate::errors::LoadError;
use crate::model::{RawTable, RawValue};
use crate::registry::TableReader;

/// Reads comma-delimited text. The first record is the header; data
/// fields are sniffed into numbers where they parse cleanly.
pub struct DelimitedReader;

impl TableReader for DelimitedReader {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn read(&self, path: &Path) -> Result<RawTable, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let content = std::str::from_utf8(&bytes).map_err(|_| LoadError::NotText {
            path: path.to_path_buf(),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = reader.records();
        let header = records
            .next()
            .ok_or_else(|| LoadError::EmptyTable {
                path: path.to_path_buf(),
            })?
            .map_err(|source| LoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?;

        let columns = header
            .iter()
            .enumerate()
            .map(|(index, field)| {
                let trimmed = field.trim();
                if trimmed.is_empty() {
                    format!("column_{index}")
                } else {
                    trimmed.to_string()
                }
            })
            .collect();

        let mut table = RawTable::new(columns);
        for record in records {
            let record = record.map_err(|source| LoadError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            table.push_row(record.iter().map(RawValue::from_field).collect());
        }
        Ok(table)
    }
}
