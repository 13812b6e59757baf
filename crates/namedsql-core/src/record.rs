//! Typed decoding of rows into record structs.
//!
//! Instead of inspecting a struct at runtime, a record declares a static
//! table of its fields ([`Record::FIELDS`]) and a hook that decodes one value
//! into one field. `#[derive(Record)]` from `namedsql-derive` writes both.
//!
//! Columns are paired with fields by position: column `i` is decoded into
//! field `i` when the field name equals the column name ignoring ASCII case,
//! or when the field carries an explicit column tag equal to the column
//! name. Every other column goes to [`Record::decode_unmatched`].

use tracing::trace;

use crate::error::{Error, Result};
use crate::value::{FromSqlValue, SqlValue};

/// One entry of a record's field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    /// Rust field name.
    pub field: &'static str,
    /// Explicit column name, if tagged.
    pub column: Option<&'static str>,
}

impl FieldMapping {
    /// A field matched by its own name.
    #[must_use]
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            column: None,
        }
    }

    /// A field matched by an explicit column name.
    #[must_use]
    pub const fn tagged(field: &'static str, column: &'static str) -> Self {
        Self {
            field,
            column: Some(column),
        }
    }

    /// Returns true if this field accepts `column`.
    #[must_use]
    pub fn matches(&self, column: &str) -> bool {
        self.field.eq_ignore_ascii_case(column) || self.column == Some(column)
    }
}

/// A struct that rows can be decoded into.
pub trait Record: Default {
    /// Fields in declaration order.
    const FIELDS: &'static [FieldMapping];

    /// Decodes `value` into the field at `field` (an index into `FIELDS`).
    ///
    /// # Errors
    ///
    /// `CannotConvert` when the value does not fit the field type.
    fn decode_field(&mut self, field: usize, column: &str, value: &SqlValue) -> Result<()>;

    /// Receives a column that matched no field.
    fn decode_unmatched(&mut self, column: &str, value: &SqlValue) {
        trace!(column, kind = value.kind(), "Column has no matching field");
    }
}

/// Converts a value for a record field, attaching the column to errors.
///
/// # Errors
///
/// `CannotConvert` when the value is outside `T`'s coercion set.
pub fn decode_value<T: FromSqlValue>(column: &str, value: &SqlValue) -> Result<T> {
    T::from_sql_value(value).ok_or_else(|| Error::CannotConvert {
        column: column.to_string(),
        kind: value.kind(),
        target: T::TYPE_NAME,
    })
}

/// Column-to-field routing for one result, computed once per column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    targets: Vec<Option<usize>>,
}

impl ColumnPlan {
    /// Builds the plan for decoding `columns` into `T`.
    #[must_use]
    pub fn new<T: Record>(columns: &[String]) -> Self {
        let targets = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                T::FIELDS
                    .get(i)
                    .filter(|mapping| mapping.matches(column))
                    .map(|_| i)
            })
            .collect();
        Self { targets }
    }

    /// Returns the field index column `i` decodes into, if any.
    #[must_use]
    pub fn target(&self, column: usize) -> Option<usize> {
        self.targets.get(column).copied().flatten()
    }

    /// Decodes one scanned row.
    ///
    /// # Errors
    ///
    /// The first field conversion error.
    pub fn decode<T: Record>(&self, columns: &[String], values: &[SqlValue]) -> Result<T> {
        let mut record = T::default();
        for (i, (column, value)) in columns.iter().zip(values).enumerate() {
            match self.target(i) {
                Some(field) => record.decode_field(field, column, value)?,
                None => record.decode_unmatched(column, value),
            }
        }
        Ok(record)
    }
}
