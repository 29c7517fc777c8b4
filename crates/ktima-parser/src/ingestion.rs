use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::LoadError;
use crate::model::{RawTable, RawValue};
use crate::registry::load_table;

/// Column appended to every row when multi-source rows are tagged with
/// their originating source label.
pub const SOURCE_TAG_COLUMN: &str = "source";

/// One selected tabular source: where it lives and how its rows are
/// labelled if tagging is requested (year for built-in files, file
/// stem otherwise).
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub label: String,
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { label, path }
    }

    pub fn with_label(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub label: String,
    pub path: PathBuf,
    pub rows: usize,
    pub cache_hit: bool,
}

#[derive(Debug)]
pub struct LoadedSources {
    pub table: RawTable,
    pub reports: Vec<LoadReport>,
}

/// Cache of parsed tables keyed by blake3 content hash. Purely a
/// re-parse saver: a miss must produce the same table a hit would.
#[derive(Debug, Default)]
pub struct TableCache {
    entries: HashMap<String, RawTable>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get_or_load(&mut self, path: &Path) -> Result<(RawTable, bool), LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let key = blake3::hash(&bytes).to_hex().to_string();

        if let Some(table) = self.entries.get(&key) {
            debug!(path = %path.display(), "source cache hit");
            return Ok((table.clone(), true));
        }

        let table = load_table(path)?;
        self.entries.insert(key, table.clone());
        Ok((table, false))
    }
}

/// Load every selected source and concatenate into one record set.
/// Any individual load failure aborts the whole run; no partial
/// table is ever returned.
pub fn load_sources(
    files: &[SourceFile],
    tag_sources: bool,
    mut cache: Option<&mut TableCache>,
) -> Result<LoadedSources, LoadError> {
    if files.is_empty() {
        return Err(LoadError::NoSources);
    }

    let mut tables = Vec::with_capacity(files.len());
    let mut reports = Vec::with_capacity(files.len());

    for file in files {
        let (mut table, cache_hit) = match cache.as_deref_mut() {
            Some(cache) => cache.get_or_load(&file.path)?,
            None => (load_table(&file.path)?, false),
        };

        if tag_sources {
            table.add_column(SOURCE_TAG_COLUMN, RawValue::Text(file.label.clone()));
        }

        info!(
            source = %file.path.display(),
            rows = table.height(),
            cache_hit,
            "loaded source"
        );
        reports.push(LoadReport {
            label: file.label.clone(),
            path: file.path.clone(),
            rows: table.height(),
            cache_hit,
        });
        tables.push(table);
    }

    Ok(LoadedSources {
        table: RawTable::concat(tables),
        reports,
    })
}

/// A tabular file found in the built-in sources directory, with the
/// year parsed out of its file stem when one is present.
#[derive(Debug, Clone)]
pub struct BuiltinSource {
    pub path: PathBuf,
    pub year: Option<i32>,
}

impl BuiltinSource {
    pub fn to_source_file(&self) -> SourceFile {
        match self.year {
            Some(year) => SourceFile::with_label(&self.path, year.to_string()),
            None => SourceFile::new(&self.path),
        }
    }
}

const BUILTIN_PATTERNS: [&str; 4] = ["*.xlsx", "*.xlsm", "*.xls", "*.csv"];

/// Scan a directory of pre-supplied tabular files. Results are sorted
/// by file name; files without a recognizable year token are still
/// listed so the caller can see them.
pub fn scan_builtin_dir(dir: &Path) -> Result<Vec<BuiltinSource>, LoadError> {
    let mut sources = Vec::new();

    for pattern in BUILTIN_PATTERNS {
        let full = dir.join(pattern);
        let full = full.to_string_lossy();
        let paths = glob::glob(&full).map_err(|err| LoadError::DirScan {
            dir: dir.to_path_buf(),
            message: err.to_string(),
        })?;

        for entry in paths {
            let path = entry.map_err(|err| LoadError::DirScan {
                dir: dir.to_path_buf(),
                message: err.to_string(),
            })?;
            let year = path
                .file_stem()
                .and_then(|stem| year_token(&stem.to_string_lossy()));
            sources.push(BuiltinSource { path, year });
        }
    }

    sources.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(sources)
}

/// Restrict a built-in listing to the requested years. An empty year
/// list selects every source that has a year.
pub fn select_years(sources: &[BuiltinSource], years: &[i32]) -> Vec<SourceFile> {
    sources
        .iter()
        .filter(|source| match source.year {
            Some(year) => years.is_empty() || years.contains(&year),
            None => false,
        })
        .map(BuiltinSource::to_source_file)
        .collect()
}

/// First run of exactly four ASCII digits in the stem, accepted as a
/// year when it lands in a plausible range.
fn year_token(stem: &str) -> Option<i32> {
    let bytes = stem.as_bytes();
    let mut start = None;
    let mut len = 0;

    for (index, byte) in bytes.iter().enumerate() {
        if byte.is_ascii_digit() {
            if start.is_none() {
                start = Some(index);
                len = 0;
            }
            len += 1;
        } else {
            if let Some(begin) = start {
                if len == 4 {
                    return parse_year(&stem[begin..begin + 4]);
                }
            }
            start = None;
        }
    }

    if let Some(begin) = start {
        if len == 4 {
            return parse_year(&stem[begin..begin + 4]);
        }
    }
    None
}

fn parse_year(token: &str) -> Option<i32> {
    let year = token.parse::<i32>().ok()?;
    (1900..=2100).contains(&year).then_some(year)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_token_finds_first_four_digit_run() {
        assert_eq!(year_token("sales_2021"), Some(2021));
        assert_eq!(year_token("2019_sales_final"), Some(2019));
        assert_eq!(year_token("apografi-1995-v2"), Some(1995));
    }

    #[test]
    fn year_token_rejects_longer_runs_and_implausible_years() {
        assert_eq!(year_token("sales_20215"), None);
        assert_eq!(year_token("row_0042"), None);
        assert_eq!(year_token("sales"), None);
    }

    #[test]
    fn select_years_skips_unlabelled_files() {
        let sources = vec![
            BuiltinSource {
                path: PathBuf::from("data/sales_2021.xlsx"),
                year: Some(2021),
            },
            BuiltinSource {
                path: PathBuf::from("data/notes.xlsx"),
                year: None,
            },
        ];

        let all = select_years(&sources, &[]);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].label, "2021");

        let none = select_years(&sources, &[2022]);
        assert!(none.is_empty());
    }
}
