use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use ktima_parser::RawTable;

use crate::period::SaleRecord;
use crate::validation::ResolvedColumns;

/// Selection value meaning "no filter for this column".
pub const ALL_SENTINEL: &str = "(all)";

/// Equality filters over the resolved dimension columns. Clauses
/// combine with AND; a record passes only if every clause matches
/// exactly.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone)]
struct Clause {
    /// Slot in `SaleRecord::dimensions`, not a raw table index.
    slot: usize,
    value: String,
}

impl FilterSet {
    /// Build the filter set from the configured column -> value
    /// mapping. Sentinel selections are dropped; filters naming a
    /// column that is not a present dimension are ignored (the column
    /// simply is not filterable), with a warning for visibility.
    pub fn resolve(filters: &BTreeMap<String, String>, columns: &ResolvedColumns) -> FilterSet {
        let mut clauses = Vec::new();

        for (name, value) in filters {
            if value == ALL_SENTINEL {
                continue;
            }
            match columns
                .dimensions
                .iter()
                .position(|dimension| &dimension.name == name)
            {
                Some(slot) => clauses.push(Clause {
                    slot,
                    value: value.clone(),
                }),
                None => warn!(column = %name, "filter on absent column ignored"),
            }
        }

        FilterSet { clauses }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.clauses.iter().all(|clause| {
            record.dimensions[clause.slot].as_deref() == Some(clause.value.as_str())
        })
    }

    /// Retain matching records as a new view.
    pub fn apply(&self, records: &[SaleRecord]) -> Vec<SaleRecord> {
        if self.clauses.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }
}

/// Sorted distinct non-empty values per present candidate column:
/// what a selection UI offers next to the "(all)" sentinel.
pub fn dimension_values(table: &RawTable, candidates: &[String]) -> Vec<(String, Vec<String>)> {
    candidates
        .iter()
        .filter_map(|name| {
            let index = table.column_index(name)?;
            let values: BTreeSet<String> = table
                .rows
                .iter()
                .filter_map(|row| row[index].display_string())
                .collect();
            Some((name.clone(), values.into_iter().collect()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::AgeClass;
    use crate::validation::{ResolvedDimension, ResolvedColumns};
    use chrono::NaiveDate;
    use ktima_parser::{RawTable, RawValue};

    fn record(region: &str, category: &str) -> SaleRecord {
        SaleRecord {
            period: "2021-03".to_string(),
            sale_date: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
            total_sqm: 80.0,
            age_class: AgeClass::MidAge,
            dimensions: vec![Some(region.to_string()), Some(category.to_string())],
        }
    }

    fn columns() -> ResolvedColumns {
        ResolvedColumns {
            date: 0,
            built_year: 1,
            main_area: 2,
            aux_area: None,
            dimensions: vec![
                ResolvedDimension {
                    name: "region".into(),
                    index: 3,
                },
                ResolvedDimension {
                    name: "category".into(),
                    index: 4,
                },
            ],
        }
    }

    fn filter_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn filters_combine_with_and() {
        let records = vec![
            record("ΑΤΤΙΚΗΣ", "Διαμέρισμα"),
            record("ΑΤΤΙΚΗΣ", "Μονοκατοικία"),
            record("ΘΕΣΣΑΛΟΝΙΚΗΣ", "Διαμέρισμα"),
        ];

        let both = FilterSet::resolve(
            &filter_map(&[("region", "ΑΤΤΙΚΗΣ"), ("category", "Διαμέρισμα")]),
            &columns(),
        );
        assert_eq!(both.apply(&records).len(), 1);
    }

    #[test]
    fn sequential_filters_equal_simultaneous_filters() {
        let records = vec![
            record("ΑΤΤΙΚΗΣ", "Διαμέρισμα"),
            record("ΑΤΤΙΚΗΣ", "Μονοκατοικία"),
            record("ΘΕΣΣΑΛΟΝΙΚΗΣ", "Διαμέρισμα"),
        ];

        let first = FilterSet::resolve(&filter_map(&[("region", "ΑΤΤΙΚΗΣ")]), &columns());
        let second = FilterSet::resolve(&filter_map(&[("category", "Διαμέρισμα")]), &columns());
        let chained = second.apply(&first.apply(&records));

        let combined = FilterSet::resolve(
            &filter_map(&[("region", "ΑΤΤΙΚΗΣ"), ("category", "Διαμέρισμα")]),
            &columns(),
        )
        .apply(&records);

        assert_eq!(chained.len(), combined.len());
        assert_eq!(chained.len(), 1);
    }

    #[test]
    fn sentinel_and_absent_columns_produce_no_clauses() {
        let filters = filter_map(&[("region", ALL_SENTINEL), ("nowhere", "x")]);
        let set = FilterSet::resolve(&filters, &columns());
        assert!(set.is_empty());
    }

    #[test]
    fn records_with_missing_dimension_values_never_match() {
        let mut orphan = record("ΑΤΤΙΚΗΣ", "Διαμέρισμα");
        orphan.dimensions[0] = None;

        let set = FilterSet::resolve(&filter_map(&[("region", "ΑΤΤΙΚΗΣ")]), &columns());
        assert!(!set.matches(&orphan));
    }

    #[test]
    fn dimension_values_are_sorted_and_deduplicated() {
        let mut table = RawTable::new(vec!["region".into()]);
        table.push_row(vec![RawValue::Text("B".into())]);
        table.push_row(vec![RawValue::Text("A".into())]);
        table.push_row(vec![RawValue::Text("B".into())]);
        table.push_row(vec![RawValue::Empty]);

        let values = dimension_values(&table, &["region".to_string(), "absent".to_string()]);
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].1, vec!["A".to_string(), "B".to_string()]);
    }
}
