use std::path::Path;

use crate::errors::{LoadError, ReaderAttempt};
use crate::formats::{DelimitedReader, XlsxReader};
use crate::model::RawTable;

pub trait TableReader {
    fn name(&self) -> &'static str;
    fn read(&self, path: &Path) -> Result<RawTable, LoadError>;
}

/// Load one tabular source, trying the workbook reader before the
/// delimited reader. The workbook reader rejects plain text quickly,
/// and the delimited reader rejects binary content via its UTF-8
/// check, so ordering decides ties in favor of the richer format.
pub fn load_table(path: &Path) -> Result<RawTable, LoadError> {
    let xlsx = XlsxReader;
    let delimited = DelimitedReader;
    let readers: [&dyn TableReader; 2] = [&xlsx, &delimited];
    read_with_readers(path, &readers)
}

pub fn read_with_readers(
    path: &Path,
    readers: &[&dyn TableReader],
) -> Result<RawTable, LoadError> {
    let mut attempts = Vec::new();

    for reader in readers {
        match reader.read(path) {
            Ok(table) => return Ok(table),
            // A missing or unreadable file fails the same way for every
            // reader; report it directly instead of as a format attempt.
            Err(err @ LoadError::Io { .. }) => return Err(err),
            Err(err) => attempts.push(ReaderAttempt::new(reader.name(), err.to_string())),
        }
    }

    Err(LoadError::UnsupportedFormat {
        path: path.to_path_buf(),
        attempts,
    })
}
