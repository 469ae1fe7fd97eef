//! SQL literal encoding
//!
//! Turns tagged cells into SQL literals and rows into a single multi-row
//! `INSERT` statement.

use crate::core::database::quote_identifier;
use crate::core::database_types::DatabaseType;
use crate::core::value::{ColumnValue, Row};

/// Encodes values for one target dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueEncoder {
    backslash_escapes: bool,
}

impl ValueEncoder {
    /// Encoder with both escape passes, as MySQL reads string literals
    pub const MYSQL: ValueEncoder = ValueEncoder {
        backslash_escapes: true,
    };

    pub fn for_dialect(db_type: DatabaseType) -> Self {
        Self {
            backslash_escapes: db_type.backslash_escapes(),
        }
    }

    /// Encode one cell
    ///
    /// `Null` becomes `NULL`, numerics are written as-is and bytes as an
    /// `X'..'` hex literal. Text is single-quoted after doubling quotes and
    /// then (for dialects where it is an escape character) doubling
    /// backslashes.
    pub fn encode(&self, value: &ColumnValue) -> String {
        match value {
            ColumnValue::Null => "NULL".to_string(),
            ColumnValue::Numeric(text) => text.clone(),
            ColumnValue::Binary(bytes) => format!("X'{}'", hex::encode_upper(bytes)),
            ColumnValue::Text(text) => {
                let quoted = text.replace('\'', "''");
                let escaped = if self.backslash_escapes {
                    quoted.replace('\\', "\\\\")
                } else {
                    quoted
                };
                format!("'{}'", escaped)
            }
        }
    }

    /// Encode a row as a parenthesized value tuple
    pub fn encode_row(&self, row: &Row) -> String {
        let values: Vec<String> = row.iter().map(|v| self.encode(v)).collect();
        format!("({})", values.join(", "))
    }

    /// Render one `INSERT` for every row, terminated once
    ///
    /// With `columns` the statement names its target columns; otherwise the
    /// tuples are positional. Returns `None` when there are no rows; empty
    /// tables get no insert.
    pub fn insert_statement(
        &self,
        table: &str,
        columns: Option<&[String]>,
        rows: &[Row],
    ) -> Option<String> {
        if rows.is_empty() {
            return None;
        }
        let target = match columns {
            Some(columns) => {
                let names: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
                format!("{} ({})", quote_identifier(table), names.join(", "))
            }
            None => quote_identifier(table),
        };
        let tuples: Vec<String> = rows.iter().map(|r| self.encode_row(r)).collect();
        Some(format!(
            "INSERT INTO {} VALUES \n{};",
            target,
            tuples.join(",\n")
        ))
    }

    /// Reverse [`ValueEncoder::encode`] for a quoted text literal
    ///
    /// Returns `None` if `literal` is not a quoted literal this encoder could
    /// have produced.
    pub fn decode_text(&self, literal: &str) -> Option<String> {
        let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' if self.backslash_escapes => match chars.next()? {
                    '\\' => out.push('\\'),
                    _ => return None,
                },
                '\'' => match chars.next()? {
                    '\'' => out.push('\''),
                    _ => return None,
                },
                other => out.push(other),
            }
        }
        Some(out)
    }
}

impl Default for ValueEncoder {
    fn default() -> Self {
        Self::MYSQL
    }
}
