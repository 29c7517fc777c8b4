use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// One reader's reason for rejecting a source, kept so an
/// unrecognized-format error can explain every attempt.
#[derive(Debug, Clone)]
pub struct ReaderAttempt {
    pub reader: &'static str,
    pub message: String,
}

impl ReaderAttempt {
    pub fn new(reader: &'static str, message: impl Into<String>) -> Self {
        Self {
            reader,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReaderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.reader, self.message)
    }
}

/// Source loading is fail-fast: any of these aborts the whole run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read workbook '{path}': {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook '{path}' contains no worksheets")]
    NoWorksheet { path: PathBuf },

    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' is not valid UTF-8 text")]
    NotText { path: PathBuf },

    #[error("source '{path}' has no header row")]
    EmptyTable { path: PathBuf },

    #[error("no reader recognized '{path}'; attempts: {attempts:?}")]
    UnsupportedFormat {
        path: PathBuf,
        attempts: Vec<ReaderAttempt>,
    },

    #[error("failed to scan directory '{dir}': {message}")]
    DirScan { dir: PathBuf, message: String },

    #[error("no sources selected")]
    NoSources,
}
