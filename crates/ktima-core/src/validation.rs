// crates/ktima-core/src/validation.rs

use ktima_parser::RawTable;

use crate::config::ColumnMap;
use crate::error::{PipelineError, Result};

/// Column roles resolved to indices in one pass over the header.
/// Every later stage works with indices; no stage re-checks column
/// existence.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    pub date: usize,
    pub built_year: usize,
    pub main_area: usize,
    pub aux_area: Option<usize>,
    /// Candidate dimension columns actually present, in the order the
    /// configuration lists them.
    pub dimensions: Vec<ResolvedDimension>,
}

#[derive(Debug, Clone)]
pub struct ResolvedDimension {
    pub name: String,
    pub index: usize,
}

/// Resolve the configured column names against the loaded header.
/// The three required roles (sale date, year built, main area) must
/// all be present; anything missing halts the run with the full list
/// of detected columns. Aux area and dimension candidates are
/// optional and silently skipped when absent.
pub fn resolve(table: &RawTable, columns: &ColumnMap) -> Result<ResolvedColumns> {
    let date = table.column_index(&columns.date);
    let built_year = table.column_index(&columns.built_year);
    let main_area = table.column_index(&columns.main_area);

    let (Some(date), Some(built_year), Some(main_area)) = (date, built_year, main_area) else {
        let required = [
            (&columns.date, date),
            (&columns.built_year, built_year),
            (&columns.main_area, main_area),
        ];
        let missing = required
            .iter()
            .filter(|(_, index)| index.is_none())
            .map(|(name, _)| (*name).clone())
            .collect();
        return Err(PipelineError::SchemaMismatch {
            missing,
            detected: table.columns.clone(),
        });
    };

    let dimensions = columns
        .dimensions
        .iter()
        .filter_map(|name| {
            table.column_index(name).map(|index| ResolvedDimension {
                name: name.clone(),
                index,
            })
        })
        .collect();

    Ok(ResolvedColumns {
        date,
        built_year,
        main_area,
        aux_area: table.column_index(&columns.aux_area),
        dimensions,
    })
}
