pub mod errors;
pub mod formats;
pub mod ingestion;
pub mod model;
mod registry;

pub use errors::{LoadError, ReaderAttempt};
pub use ingestion::{
    load_sources, scan_builtin_dir, select_years, BuiltinSource, LoadReport, LoadedSources,
    SourceFile, TableCache, SOURCE_TAG_COLUMN,
};
pub use model::{RawTable, RawValue};
pub use registry::{load_table, read_with_readers, TableReader};

#[cfg(test)]
mod tests;
