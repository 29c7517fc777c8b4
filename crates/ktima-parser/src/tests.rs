use std::path::PathBuf;

use chrono::NaiveDate;

use crate::errors::LoadError;
use crate::ingestion::{load_sources, SourceFile, TableCache, SOURCE_TAG_COLUMN};
use crate::model::RawValue;
use crate::registry::load_table;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

#[test]
fn loads_delimited_source_with_greek_headers() {
    let table = load_table(&fixture("sales_2021.csv")).expect("CSV load failed");

    assert_eq!(table.height(), 6);
    assert_eq!(table.width(), 6);
    assert_eq!(table.columns[0], "Ημερομηνία Συμβολαίου");
    assert!(table.column_index("Νομαρχία").is_some());

    // Areas sniff as numbers, dates stay text, blanks stay empty.
    assert_eq!(*table.value(0, 2), RawValue::Number(80.0));
    assert_eq!(
        *table.value(0, 0),
        RawValue::Text("15/03/2021".to_string())
    );
    assert_eq!(*table.value(3, 3), RawValue::Empty);
    assert_eq!(*table.value(4, 1), RawValue::Empty);
    assert_eq!(*table.value(5, 0), RawValue::Number(44256.0));
}

#[test]
fn loads_workbook_source_with_typed_cells() {
    let table = load_table(&fixture("sales_mini.xlsx")).expect("workbook load failed");

    assert_eq!(table.height(), 3);
    assert_eq!(table.columns.len(), 5);
    assert_eq!(table.columns[4], "Νομαρχία");

    // The date column carries a date number format, so calamine hands
    // back typed datetimes rather than bare serials.
    let expected = NaiveDate::from_ymd_opt(2021, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(*table.value(0, 0), RawValue::DateTime(expected));

    assert_eq!(*table.value(0, 1), RawValue::Number(1985.0));
    assert_eq!(*table.value(0, 2), RawValue::Number(80.5));
    assert_eq!(*table.value(2, 0), RawValue::Text("not a date".to_string()));
    assert_eq!(*table.value(1, 4), RawValue::Text("ΘΕΣΣΑΛΟΝΙΚΗΣ".to_string()));
}

#[test]
fn unrecognized_content_reports_every_reader_attempt() {
    let err = load_table(&fixture("garbage.bin")).expect_err("garbage must not load");

    match err {
        LoadError::UnsupportedFormat { attempts, .. } => {
            assert_eq!(attempts.len(), 2);
            assert_eq!(attempts[0].reader, "workbook");
            assert_eq!(attempts[1].reader, "delimited");
        }
        other => panic!("expected UnsupportedFormat, got {other:?}"),
    }
}

#[test]
fn missing_file_is_an_io_error_not_a_format_error() {
    let err = load_table(&fixture("no_such_file.csv")).expect_err("missing file must fail");
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn multi_source_load_concatenates_with_column_union() {
    let files = vec![
        SourceFile::with_label(fixture("sales_2021.csv"), "2021"),
        SourceFile::with_label(fixture("sales_2022.csv"), "2022"),
    ];
    let loaded = load_sources(&files, false, None).expect("multi-source load failed");

    assert_eq!(loaded.table.height(), 8);
    // 2022 brings one extra column into the union.
    assert_eq!(loaded.table.width(), 7);
    let municipality = loaded
        .table
        .column_index("Δήμος Καλλικράτη")
        .expect("union column missing");
    assert_eq!(*loaded.table.value(0, municipality), RawValue::Empty);
    assert_eq!(
        *loaded.table.value(6, municipality),
        RawValue::Text("Αθηναίων".to_string())
    );
}

#[test]
fn source_tagging_appends_label_column() {
    let files = vec![
        SourceFile::with_label(fixture("sales_2021.csv"), "2021"),
        SourceFile::with_label(fixture("sales_2022.csv"), "2022"),
    ];
    let loaded = load_sources(&files, true, None).expect("tagged load failed");

    let tag = loaded
        .table
        .column_index(SOURCE_TAG_COLUMN)
        .expect("tag column missing");
    assert_eq!(*loaded.table.value(0, tag), RawValue::Text("2021".to_string()));
    assert_eq!(*loaded.table.value(7, tag), RawValue::Text("2022".to_string()));
}

#[test]
fn failing_source_aborts_the_whole_load() {
    let files = vec![
        SourceFile::with_label(fixture("sales_2021.csv"), "2021"),
        SourceFile::with_label(fixture("no_such_file.csv"), "missing"),
    ];
    assert!(load_sources(&files, false, None).is_err());
}

#[test]
fn empty_selection_is_rejected() {
    assert!(matches!(
        load_sources(&[], false, None),
        Err(LoadError::NoSources)
    ));
}

#[test]
fn cache_hit_reproduces_the_miss_result_exactly() {
    let mut cache = TableCache::new();
    let files = vec![SourceFile::with_label(fixture("sales_2021.csv"), "2021")];

    let first = load_sources(&files, false, Some(&mut cache)).expect("first load failed");
    assert!(!first.reports[0].cache_hit);
    assert_eq!(cache.len(), 1);

    let second = load_sources(&files, false, Some(&mut cache)).expect("second load failed");
    assert!(second.reports[0].cache_hit);
    assert_eq!(first.table, second.table);
}
