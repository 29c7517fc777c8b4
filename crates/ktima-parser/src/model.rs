use chrono::NaiveDateTime;

/// A single cell as read from a tabular source, before any
/// pipeline-side coercion. Spreadsheet cells keep their native type;
/// delimited text is sniffed into `Number` where it parses cleanly.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Empty,
    Number(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Bool(bool),
}

impl RawValue {
    /// Sniff a delimited-text field: empty stays empty, clean numerics
    /// become `Number`, everything else is kept verbatim as `Text`.
    pub fn from_field(field: &str) -> Self {
        let trimmed = field.trim();
        if trimmed.is_empty() {
            return RawValue::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => RawValue::Number(value),
            _ => RawValue::Text(trimmed.to_string()),
        }
    }

    /// Canonical display form, used for dimension values and filter
    /// comparison. `Empty` has none.
    pub fn display_string(&self) -> Option<String> {
        match self {
            RawValue::Empty => None,
            RawValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < 1e15 {
                    Some(format!("{}", *value as i64))
                } else {
                    Some(value.to_string())
                }
            }
            RawValue::Text(text) => Some(text.clone()),
            RawValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            RawValue::Bool(value) => Some(value.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RawValue::Empty)
    }
}

/// An in-memory table: one header row of column names plus untyped
/// data rows. Rows always have exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawValue>>,
}

impl RawTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Append a row, padding or truncating to the header width so that
    /// ragged input never produces ragged storage.
    pub fn push_row(&mut self, mut row: Vec<RawValue>) {
        row.resize(self.columns.len(), RawValue::Empty);
        self.rows.push(row);
    }

    pub fn value(&self, row: usize, column: usize) -> &RawValue {
        &self.rows[row][column]
    }

    /// Append a constant-valued column, e.g. a source tag.
    pub fn add_column(&mut self, name: impl Into<String>, fill: RawValue) {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(fill.clone());
        }
    }

    /// Concatenate tables by column-name union, in first-seen order.
    /// Cells absent from a source become `Empty`; no further schema
    /// reconciliation is attempted.
    pub fn concat(tables: Vec<RawTable>) -> RawTable {
        let mut columns: Vec<String> = Vec::new();
        for table in &tables {
            for name in &table.columns {
                if !columns.iter().any(|existing| existing == name) {
                    columns.push(name.clone());
                }
            }
        }

        let mut combined = RawTable::new(columns);
        for table in tables {
            // Map each source column to its slot in the union header.
            let slots: Vec<usize> = table
                .columns
                .iter()
                .map(|name| {
                    combined
                        .column_index(name)
                        .expect("union header must contain every source column")
                })
                .collect();

            for row in table.rows {
                let mut out = vec![RawValue::Empty; combined.width()];
                for (cell, &slot) in row.into_iter().zip(&slots) {
                    out[slot] = cell;
                }
                combined.rows.push(out);
            }
        }
        combined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_sniffing_classifies_numbers_text_and_blanks() {
        assert_eq!(RawValue::from_field("  "), RawValue::Empty);
        assert_eq!(RawValue::from_field("80.5"), RawValue::Number(80.5));
        assert_eq!(RawValue::from_field("-3"), RawValue::Number(-3.0));
        assert_eq!(
            RawValue::from_field(" Αθήνα "),
            RawValue::Text("Αθήνα".to_string())
        );
    }

    #[test]
    fn display_string_renders_whole_numbers_without_fraction() {
        assert_eq!(
            RawValue::Number(1985.0).display_string().as_deref(),
            Some("1985")
        );
        assert_eq!(
            RawValue::Number(80.5).display_string().as_deref(),
            Some("80.5")
        );
        assert_eq!(RawValue::Empty.display_string(), None);
    }

    #[test]
    fn push_row_pads_and_truncates_to_header_width() {
        let mut table = RawTable::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![RawValue::Number(1.0)]);
        table.push_row(vec![
            RawValue::Number(1.0),
            RawValue::Number(2.0),
            RawValue::Number(3.0),
        ]);

        assert_eq!(table.rows[0].len(), 2);
        assert_eq!(table.rows[0][1], RawValue::Empty);
        assert_eq!(table.rows[1].len(), 2);
    }

    #[test]
    fn concat_takes_column_union_and_fills_gaps_with_empty() {
        let mut first = RawTable::new(vec!["a".into(), "b".into()]);
        first.push_row(vec![RawValue::Number(1.0), RawValue::Number(2.0)]);

        let mut second = RawTable::new(vec!["b".into(), "c".into()]);
        second.push_row(vec![RawValue::Number(3.0), RawValue::Number(4.0)]);

        let combined = RawTable::concat(vec![first, second]);
        assert_eq!(combined.columns, vec!["a", "b", "c"]);
        assert_eq!(combined.height(), 2);
        assert_eq!(combined.rows[0][2], RawValue::Empty);
        assert_eq!(combined.rows[1][0], RawValue::Empty);
        assert_eq!(combined.rows[1][1], RawValue::Number(3.0));
    }

    #[test]
    fn add_column_backfills_every_row() {
        let mut table = RawTable::new(vec!["a".into()]);
        table.push_row(vec![RawValue::Number(1.0)]);
        table.push_row(vec![RawValue::Number(2.0)]);
        table.add_column("source", RawValue::Text("2021".into()));

        assert_eq!(table.columns, vec!["a", "source"]);
        assert!(table
            .rows
            .iter()
            .all(|row| row[1] == RawValue::Text("2021".into())));
    }
}
