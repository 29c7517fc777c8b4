use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::debug;

use ktima_parser::{RawTable, RawValue};

/// Spreadsheet serial day 0, i.e. the 1900 date system with its
/// historical off-by-two already folded in.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serial for 9999-12-31; anything outside (0, max] is not a date.
const SERIAL_MAX: f64 = 2_958_465.0;

static DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

static DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
];

/// Coerce one raw cell into a calendar date. Typed datetimes pass
/// through, numerics are treated as spreadsheet serials, and text is
/// tried against the known formats (then as a serial written out as
/// text). Anything else is None; this never fails.
pub fn normalize_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::DateTime(dt) => Some(dt.date()),
        RawValue::Number(serial) => date_from_serial(*serial),
        RawValue::Text(text) => {
            let trimmed = text.trim();
            parse_text_date(trimmed)
                .or_else(|| trimmed.parse::<f64>().ok().and_then(date_from_serial))
        }
        RawValue::Empty | RawValue::Bool(_) => None,
    }
}

/// Normalize a whole date column: same length as the input,
/// unparseable entries nulled out. Row dropping happens in the
/// pipeline, not here.
pub fn normalize_dates(table: &RawTable, date_column: usize) -> Vec<Option<NaiveDate>> {
    let dates: Vec<Option<NaiveDate>> = table
        .rows
        .iter()
        .map(|row| normalize_date(&row[date_column]))
        .collect();

    let dropped = dates.iter().filter(|date| date.is_none()).count();
    if dropped > 0 {
        debug!(dropped, total = dates.len(), "rows without a parseable sale date");
    }
    dates
}

/// Area coercion: numeric-looking values pass, everything else is
/// 0.0. Negative and non-finite inputs also clamp to 0 so traded
/// area can never go below zero.
pub fn coerce_area(value: &RawValue) -> f64 {
    let parsed = match value {
        RawValue::Number(number) => Some(*number),
        RawValue::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(number) if number.is_finite() && number > 0.0 => number,
        _ => 0.0,
    }
}

/// Build-year coercion keeps the missing/unparseable distinction:
/// the classifier must see None, not a sentinel zero.
pub fn coerce_built_year(value: &RawValue) -> Option<i32> {
    let number = match value {
        RawValue::Number(number) => Some(*number),
        RawValue::Text(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    if !number.is_finite() || number < i32::MIN as f64 || number > i32::MAX as f64 {
        return None;
    }
    Some(number.round() as i32)
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    None
}

fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial <= 0.0 || serial > SERIAL_MAX {
        return None;
    }
    let (year, month, day) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(year, month, day)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}
