use std::collections::{BTreeMap, BTreeSet};

use crate::calculator::AgeClass;
use crate::period::SaleRecord;

/// One output row per distinct period present in the filtered record
/// set. `age_counts` and `age_pct` are parallel to
/// `AggregateTable::age_classes`.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub period: String,
    pub sales: u64,
    pub traded_sqm: f64,
    pub age_counts: Vec<u64>,
    pub age_pct: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateTable {
    /// Age classes observed anywhere in the dataset, in fixed variant
    /// order. Periods missing a class carry an explicit zero.
    pub age_classes: Vec<AgeClass>,
    /// Rows ascend by period key; the key formats make that
    /// chronological.
    pub rows: Vec<AggregateRow>,
}

/// Two-pass aggregation over period-keyed maps.
///
/// Pass 1 accumulates sales count and traded-area sum per period.
/// Pass 2 counts (period, age class) pairs, then pivots over the
/// classes observed across the whole dataset. The passes derive from
/// the same record set, so every period exists in both; the pivot
/// lookup still falls back to zero rather than assuming it.
pub fn aggregate(records: &[SaleRecord]) -> AggregateTable {
    let mut totals: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.period.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += record.total_sqm;
    }

    let mut pair_counts: BTreeMap<(&str, AgeClass), u64> = BTreeMap::new();
    let mut observed: BTreeSet<AgeClass> = BTreeSet::new();
    for record in records {
        observed.insert(record.age_class);
        *pair_counts
            .entry((record.period.as_str(), record.age_class))
            .or_insert(0) += 1;
    }

    let age_classes: Vec<AgeClass> = AgeClass::ORDER
        .into_iter()
        .filter(|class| observed.contains(class))
        .collect();

    let rows = totals
        .into_iter()
        .map(|(period, (sales, traded_sqm))| {
            let age_counts: Vec<u64> = age_classes
                .iter()
                .map(|class| {
                    pair_counts
                        .get(&(period, *class))
                        .copied()
                        .unwrap_or(0)
                })
                .collect();
            let age_pct = age_counts
                .iter()
                .map(|count| percentage(*count, sales))
                .collect();

            AggregateRow {
                period: period.to_string(),
                sales,
                traded_sqm,
                age_counts,
                age_pct,
            }
        })
        .collect();

    AggregateTable { age_classes, rows }
}

/// Share of a period's sales, with the zero-sales guard: a
/// synthetically constructed empty period reads 0, never NaN.
pub fn percentage(count: u64, sales: u64) -> f64 {
    if sales == 0 {
        0.0
    } else {
        count as f64 / sales as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(period: &str, sqm: f64, age_class: AgeClass) -> SaleRecord {
        SaleRecord {
            period: period.to_string(),
            sale_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            total_sqm: sqm,
            age_class,
            dimensions: Vec::new(),
        }
    }

    #[test]
    fn totals_match_the_input_record_set() {
        let records = vec![
            record("2021-03", 80.0, AgeClass::PreThreshold),
            record("2021-05", 100.0, AgeClass::NewBuild),
            record("2021-05", 50.0, AgeClass::PreThreshold),
        ];
        let table = aggregate(&records);

        let total_sales: u64 = table.rows.iter().map(|row| row.sales).sum();
        let total_sqm: f64 = table.rows.iter().map(|row| row.traded_sqm).sum();
        assert_eq!(total_sales, records.len() as u64);
        assert!((total_sqm - 230.0).abs() < 1e-9);
    }

    #[test]
    fn periods_are_exactly_the_observed_keys_in_ascending_order() {
        let records = vec![
            record("2021-05", 1.0, AgeClass::Unknown),
            record("2021-03", 1.0, AgeClass::Unknown),
            record("2021-05", 1.0, AgeClass::Unknown),
        ];
        let table = aggregate(&records);

        let periods: Vec<&str> = table.rows.iter().map(|row| row.period.as_str()).collect();
        assert_eq!(periods, vec!["2021-03", "2021-05"]);
    }

    #[test]
    fn absent_classes_get_explicit_zero_counts() {
        let records = vec![
            record("2021-03", 1.0, AgeClass::PreThreshold),
            record("2021-05", 1.0, AgeClass::NewBuild),
        ];
        let table = aggregate(&records);

        assert_eq!(
            table.age_classes,
            vec![AgeClass::PreThreshold, AgeClass::NewBuild]
        );
        // 2021-03 has no new builds, 2021-05 no pre-threshold sales.
        assert_eq!(table.rows[0].age_counts, vec![1, 0]);
        assert_eq!(table.rows[1].age_counts, vec![0, 1]);
    }

    #[test]
    fn percentages_close_to_one_hundred_per_row() {
        let records = vec![
            record("2021-05", 1.0, AgeClass::PreThreshold),
            record("2021-05", 1.0, AgeClass::NewBuild),
            record("2021-05", 1.0, AgeClass::NewBuild),
            record("2021-06", 1.0, AgeClass::MidAge),
        ];
        let table = aggregate(&records);

        for row in &table.rows {
            let sum: f64 = row.age_pct.iter().sum();
            assert!(
                (sum - 100.0).abs() < 0.01,
                "percentages for {} sum to {sum}",
                row.period
            );
        }
    }

    #[test]
    fn zero_sales_percentage_is_zero_not_nan() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(3, 0), 0.0);
        assert!((percentage(1, 2) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_yields_an_empty_table() {
        let table = aggregate(&[]);
        assert!(table.rows.is_empty());
        assert!(table.age_classes.is_empty());
    }
}
