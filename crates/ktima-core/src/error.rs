// crates/ktima-core/src/error.rs

use thiserror::Error;

use ktima_parser::LoadError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to load source data: {0}")]
    Load(#[from] LoadError),

    /// The one structured user-facing validation error: required
    /// columns absent from the loaded sources, reported together with
    /// everything that was actually found so the caller can correct
    /// the column configuration and retry.
    #[error(
        "missing required columns: [{}]; detected columns: [{}]",
        .missing.join(", "),
        .detected.join(", ")
    )]
    SchemaMismatch {
        missing: Vec<String>,
        detected: Vec<String>,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Empty selection after loading/normalizing/filtering. Raised
    /// before aggregation so a zero-row table is never produced.
    #[error("no data to aggregate: {0}")]
    NoData(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
