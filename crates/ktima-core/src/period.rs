use chrono::{Datelike, NaiveDate};

use crate::calculator::{AgeClass, DerivedRow};
use crate::config::Granularity;

/// Bucket key for one sale date: `YYYY-MM`, `YYYYQn` or `YYYY`.
/// Purely a function of date and granularity: no locale, no
/// timezone. All three shapes sort chronologically as plain strings.
pub fn period_key(date: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Month => format!("{:04}-{:02}", date.year(), date.month()),
        Granularity::Quarter => format!("{:04}Q{}", date.year(), (date.month() - 1) / 3 + 1),
        Granularity::Year => format!("{:04}", date.year()),
    }
}

/// A fully normalized sale record, ready for filtering and
/// aggregation.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    pub period: String,
    pub sale_date: NaiveDate,
    pub total_sqm: f64,
    pub age_class: AgeClass,
    pub dimensions: Vec<Option<String>>,
}

pub fn assign_periods(rows: &[DerivedRow], granularity: Granularity) -> Vec<SaleRecord> {
    rows.iter()
        .map(|row| SaleRecord {
            period: period_key(row.sale_date, granularity),
            sale_date: row.sale_date,
            total_sqm: row.total_sqm,
            age_class: row.age_class,
            dimensions: row.dimensions.clone(),
        })
        .collect()
}
