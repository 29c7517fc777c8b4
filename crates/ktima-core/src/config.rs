use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Time bucket width for the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Month, Granularity::Quarter, Granularity::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Month => "month",
            Granularity::Quarter => "quarter",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Granularity {
    type Error = String;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "month" | "m" => Ok(Granularity::Month),
            "quarter" | "q" => Ok(Granularity::Quarter),
            "year" | "y" => Ok(Granularity::Year),
            other => Err(format!("unknown granularity '{other}'")),
        }
    }
}

/// Maps the pipeline's column roles onto the caller's actual column
/// names. Defaults match the known Greek transaction schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub date: String,
    pub built_year: String,
    pub main_area: String,
    pub aux_area: String,
    /// Candidate categorical dimension columns; only those present in
    /// the loaded sources become filterable.
    pub dimensions: Vec<String>,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            date: "Ημερομηνία Συμβολαίου".to_string(),
            built_year: "Έτος Κατασκευής".to_string(),
            // The leading "E" in the source schema is a Latin letter.
            main_area: "Eπιφάνεια Κύριων Χώρων (σε τ.μ.)".to_string(),
            aux_area: "Επιφάνεια Βοηθητικών Χώρων (σε τ.μ.)".to_string(),
            dimensions: vec![
                "Νομαρχία".to_string(),
                "Δήμος Καλλικράτη".to_string(),
                "Δημοτικό ή Κοινοτικό Διαμέρισμα".to_string(),
                "Κατηγορία Ακινήτου".to_string(),
            ],
        }
    }
}

/// Building-age bucket boundaries: everything built in or before
/// `pre_year` is "old"; everything built within `last_n` years of the
/// sale is "new".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeBuckets {
    pub pre_year: i32,
    pub last_n: i32,
}

impl Default for AgeBuckets {
    fn default() -> Self {
        Self {
            pre_year: 1990,
            last_n: 5,
        }
    }
}

impl AgeBuckets {
    pub fn validate(&self) -> Result<()> {
        if !(1..=50).contains(&self.last_n) {
            return Err(PipelineError::InvalidConfig(format!(
                "new-building window must be between 1 and 50 years, got {}",
                self.last_n
            )));
        }
        Ok(())
    }
}

/// Immutable configuration for one pipeline run. The interactive shell
/// collects this and re-invokes the pipeline on any change; the core
/// holds no state between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub granularity: Granularity,
    pub columns: ColumnMap,
    pub include_aux: bool,
    pub age: AgeBuckets,
    /// Equality filters: column name -> required value. The "(all)"
    /// sentinel is accepted and means "no filter for this column".
    pub filters: BTreeMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Month,
            columns: ColumnMap::default(),
            include_aux: false,
            age: AgeBuckets::default(),
            filters: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.age.validate()
    }
}
