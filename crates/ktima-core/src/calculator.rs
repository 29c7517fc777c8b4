use chrono::{Datelike, NaiveDate};

use ktima_parser::RawTable;

use crate::config::{AgeBuckets, PipelineConfig};
use crate::normalize::{coerce_area, coerce_built_year};
use crate::validation::ResolvedColumns;

/// Building-age classification of one sale, relative to the sale year.
/// Variant order is the output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeClass {
    PreThreshold,
    MidAge,
    NewBuild,
    Unknown,
}

impl AgeClass {
    pub const ORDER: [AgeClass; 4] = [
        AgeClass::PreThreshold,
        AgeClass::MidAge,
        AgeClass::NewBuild,
        AgeClass::Unknown,
    ];

    /// Label used in tables, CSV headers and chart series, e.g.
    /// `pre_1990` / `mid_age` / `new_last5y` / `unknown`.
    pub fn label(&self, age: &AgeBuckets) -> String {
        match self {
            AgeClass::PreThreshold => format!("pre_{}", age.pre_year),
            AgeClass::MidAge => "mid_age".to_string(),
            AgeClass::NewBuild => format!("new_last{}y", age.last_n),
            AgeClass::Unknown => "unknown".to_string(),
        }
    }
}

/// First matching branch wins: a missing build year dominates, the
/// pre-threshold bound is inclusive, and the new-build bound
/// (`built >= sale_year - last_n`, also inclusive) is only reached
/// after the pre-threshold check. With `pre_year >= sale_year -
/// last_n` a building can satisfy both; it classifies as
/// pre-threshold. That precedence is intentional, but such a
/// configuration makes the new bucket unreachable for old sales;
/// the caller sees it only in the output mix.
pub fn classify_age(sale_date: NaiveDate, built_year: Option<i32>, age: &AgeBuckets) -> AgeClass {
    let Some(built) = built_year else {
        return AgeClass::Unknown;
    };
    if built <= age.pre_year {
        AgeClass::PreThreshold
    } else if built >= sale_date.year() - age.last_n {
        AgeClass::NewBuild
    } else {
        AgeClass::MidAge
    }
}

/// One record after derived-field computation. Dimension values are
/// parallel to `ResolvedColumns::dimensions`.
#[derive(Debug, Clone)]
pub struct DerivedRow {
    pub sale_date: NaiveDate,
    pub total_sqm: f64,
    pub age_class: AgeClass,
    pub dimensions: Vec<Option<String>>,
}

/// Compute the derived view: rows whose normalized date is null are
/// dropped here, everything else gets its total traded area and age
/// class. Aux area only contributes when enabled and present.
pub fn derive_rows(
    table: &RawTable,
    columns: &ResolvedColumns,
    config: &PipelineConfig,
    dates: &[Option<NaiveDate>],
) -> Vec<DerivedRow> {
    let aux_column = config.include_aux.then_some(columns.aux_area).flatten();

    table
        .rows
        .iter()
        .zip(dates)
        .filter_map(|(row, date)| {
            let sale_date = (*date)?;

            let mut total_sqm = coerce_area(&row[columns.main_area]);
            if let Some(aux) = aux_column {
                total_sqm += coerce_area(&row[aux]);
            }

            let built_year = coerce_built_year(&row[columns.built_year]);

            let dimensions = columns
                .dimensions
                .iter()
                .map(|dimension| row[dimension.index].display_string())
                .collect();

            Some(DerivedRow {
                sale_date,
                total_sqm,
                age_class: classify_age(sale_date, built_year, &config.age),
                dimensions,
            })
        })
        .collect()
}
