//! Generic rows and typed column accessors.
//!
//! A [`Row`] maps column names to [`SqlValue`]s in driver column order. The
//! accessors coerce from a closed set of kinds, see [`FromSqlValue`] impls:
//!
//! | accessor  | accepts |
//! |-----------|---------|
//! | `int`     | integers, finite floats (truncated), bytes holding decimal text |
//! | `float32`, `float64` | integers, floats, bytes holding decimal text |
//! | `bool`    | integers and floats (non-zero is true), bools, bytes holding `true`/`false` or an integer |
//! | `string`  | integers, floats, bools, text, bytes holding UTF-8 |
//! | `bytes`   | bytes, text |
//!
//! Byte buffers are always read as text. `NULL` converts to nothing.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::value::{FromSqlValue, SqlValue};

/// Materialized rows, in fetch order.
pub type Rows = Vec<Row>;

/// An ordered mapping from column name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Builds a row from a column list and a scan buffer, leaving `Null` in
    /// the buffer.
    pub(crate) fn from_scan(columns: &[String], buffer: &mut [SqlValue]) -> Self {
        let mut row = Self {
            columns: Vec::with_capacity(columns.len()),
            values: Vec::with_capacity(columns.len()),
        };
        for (column, slot) in columns.iter().zip(buffer.iter_mut()) {
            row.insert(column.clone(), std::mem::take(slot));
        }
        row
    }

    // A repeated column keeps its first position and takes the later value.
    fn insert(&mut self, column: String, value: SqlValue) {
        match self.columns.iter().position(|c| *c == column) {
            Some(i) => self.values[i] = value,
            None => {
                self.columns.push(column);
                self.values.push(value);
            }
        }
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterates over `(column, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Returns the raw value of a column.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
    }

    /// Returns the raw value of a column.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` if the row has no such column.
    pub fn value(&self, column: &str) -> Result<&SqlValue> {
        self.get(column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }

    /// Returns true if the column holds `NULL`.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` if the row has no such column.
    pub fn is_null(&self, column: &str) -> Result<bool> {
        self.value(column).map(SqlValue::is_null)
    }

    /// Reads a column as any [`FromSqlValue`] type.
    ///
    /// # Errors
    ///
    /// `ColumnNotFound` if the row has no such column, `CannotConvert` if
    /// the stored kind is outside the type's coercion set.
    pub fn get_as<T: FromSqlValue>(&self, column: &str) -> Result<T> {
        let value = self.value(column)?;
        T::from_sql_value(value).ok_or_else(|| Error::CannotConvert {
            column: column.to_string(),
            kind: value.kind(),
            target: T::TYPE_NAME,
        })
    }

    /// Reads a column as a 64-bit integer.
    ///
    /// # Errors
    ///
    /// See [`Row::get_as`].
    pub fn int(&self, column: &str) -> Result<i64> {
        self.get_as(column)
    }

    /// Reads a column as a single-precision float.
    ///
    /// # Errors
    ///
    /// See [`Row::get_as`].
    pub fn float32(&self, column: &str) -> Result<f32> {
        self.get_as(column)
    }

    /// Reads a column as a double-precision float.
    ///
    /// # Errors
    ///
    /// See [`Row::get_as`].
    pub fn float64(&self, column: &str) -> Result<f64> {
        self.get_as(column)
    }

    /// Reads a column as a boolean.
    ///
    /// # Errors
    ///
    /// See [`Row::get_as`].
    pub fn bool(&self, column: &str) -> Result<bool> {
        self.get_as(column)
    }

    /// Reads a column as a string.
    ///
    /// # Errors
    ///
    /// See [`Row::get_as`].
    pub fn string(&self, column: &str) -> Result<String> {
        self.get_as(column)
    }

    /// Reads a column as raw bytes.
    ///
    /// # Errors
    ///
    /// See [`Row::get_as`].
    pub fn bytes(&self, column: &str) -> Result<Vec<u8>> {
        self.get_as(column)
    }
}

impl<C: Into<String>> FromIterator<(C, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (C, SqlValue)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (column, value) in iter {
            row.insert(column.into(), value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
