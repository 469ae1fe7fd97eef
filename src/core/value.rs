//! Column value types
//!
//! This module defines the cell, row and table shapes read from a data source.
//! The kind of each cell is decided once, when the backend reads it, and is
//! never re-derived while encoding.

use serde::{Deserialize, Serialize};

/// A single cell read from a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnValue {
    /// SQL NULL
    Null,
    /// Numeric value in its decimal text form; never quoted
    Numeric(String),
    /// Character data; always quoted when written as SQL
    Text(String),
    /// Raw bytes from a binary column; written as a hex literal
    Binary(Vec<u8>),
}

impl ColumnValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Raw bytes of the value, `None` for null
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::Null => None,
            ColumnValue::Numeric(s) | ColumnValue::Text(s) => Some(s.as_bytes()),
            ColumnValue::Binary(b) => Some(b.as_slice()),
        }
    }

    /// Tag a floating point value; non-finite values have no numeric literal
    ///
    /// The text always reads back as a float (`100.0`, `1e300`).
    pub fn from_f64(v: f64) -> Self {
        if v.is_finite() {
            ColumnValue::Numeric(format!("{:?}", v))
        } else {
            ColumnValue::Text(v.to_string())
        }
    }
}

impl From<i32> for ColumnValue {
    fn from(v: i32) -> Self {
        ColumnValue::Numeric(v.to_string())
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Numeric(v.to_string())
    }
}

impl From<u64> for ColumnValue {
    fn from(v: u64) -> Self {
        ColumnValue::Numeric(v.to_string())
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::from_f64(v)
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::Text(v)
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(v: Vec<u8>) -> Self {
        ColumnValue::Binary(v)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => ColumnValue::Null,
        }
    }
}

/// An ordered row; positions follow [`TableData::columns`]
pub type Row = Vec<ColumnValue>;

/// Column names and every row of one table, read in a single pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Columns the engine computes itself; they cannot be inserted into
    #[serde(default)]
    pub generated: Vec<String>,
}

impl TableData {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            generated: Vec::new(),
        }
    }

    pub fn with_generated(mut self, generated: Vec<String>) -> Self {
        self.generated = generated;
        self
    }

    pub fn has_generated(&self) -> bool {
        !self.generated.is_empty()
    }

    /// Same rows with generated columns projected away
    pub fn without_generated(&self) -> TableData {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| !self.generated.contains(name))
            .map(|(i, _)| i)
            .collect();

        TableData {
            columns: keep.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| keep.iter().filter_map(|&i| row.get(i).cloned()).collect())
                .collect(),
            generated: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from_types() {
        let val: ColumnValue = 42.into();
        assert_eq!(val, ColumnValue::Numeric("42".to_string()));

        let val: ColumnValue = "hello".into();
        assert_eq!(val, ColumnValue::Text("hello".to_string()));

        let val: ColumnValue = Some(7i64).into();
        assert_eq!(val, ColumnValue::Numeric("7".to_string()));

        let val: ColumnValue = Option::<i64>::None.into();
        assert_eq!(val, ColumnValue::Null);
    }

    #[test]
    fn test_float_tagging() {
        assert_eq!(ColumnValue::from(9.5), ColumnValue::Numeric("9.5".into()));
        assert_eq!(ColumnValue::from(100.0), ColumnValue::Numeric("100.0".into()));
        assert_eq!(ColumnValue::from(1e300), ColumnValue::Numeric("1e300".into()));
        assert!(matches!(ColumnValue::from(f64::INFINITY), ColumnValue::Text(_)));
        assert!(matches!(ColumnValue::from(f64::NAN), ColumnValue::Text(_)));
    }

    #[test]
    fn test_value_accessors() {
        assert!(ColumnValue::Null.is_null());
        assert_eq!(ColumnValue::Null.as_bytes(), None);
        assert_eq!(ColumnValue::from(1).as_bytes(), Some(&b"1"[..]));
        assert_eq!(ColumnValue::from("x").as_bytes(), Some(&b"x"[..]));
        assert_eq!(
            ColumnValue::from(vec![0x00, 0xff]).as_bytes(),
            Some(&[0x00, 0xff][..])
        );
    }

    #[test]
    fn test_table_data_counts() {
        let data = TableData::new(vec!["id".into()], vec![vec![1.into()], vec![2.into()]]);
        assert_eq!(data.row_count(), 2);
        assert!(!data.is_empty());
        assert!(TableData::default().is_empty());
    }

    #[test]
    fn test_without_generated() {
        let data = TableData::new(
            vec!["a".into(), "doubled".into(), "c".into()],
            vec![vec![1.into(), 2.into(), "x".into()]],
        )
        .with_generated(vec!["doubled".into()]);
        assert!(data.has_generated());

        let stored = data.without_generated();
        assert_eq!(stored.columns, vec!["a", "c"]);
        assert_eq!(stored.rows, vec![vec![ColumnValue::from(1), ColumnValue::from("x")]]);
        assert!(!stored.has_generated());
    }
}
