//! Dynamically typed SQL values and conversions in and out of them.
//!
//! `SqlValue` is the closed set of kinds a driver hands back for a column and
//! the set of kinds a caller can bind. Byte buffers are always read as the
//! textual form of the value (decimal digits, `true`/`false`, UTF-8), never
//! as a binary encoding.

use serde::Serialize;

/// A SQL value that can be bound as a parameter or read from a row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// NULL value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// 8-bit integer.
    Int8(i8),
    /// 16-bit integer.
    Int16(i16),
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// Single-precision float.
    Float32(f32),
    /// Double-precision float.
    Float64(f64),
    /// Text value.
    Text(String),
    /// Raw byte buffer.
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Returns the name of this value's kind, used in conversion errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "BOOL",
            Self::Int8(_) => "INT8",
            Self::Int16(_) => "INT16",
            Self::Int32(_) => "INT32",
            Self::Int64(_) => "INT64",
            Self::Float32(_) => "FLOAT32",
            Self::Float64(_) => "FLOAT64",
            Self::Text(_) => "TEXT",
            Self::Bytes(_) => "BYTES",
        }
    }

    /// Returns true for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the literal used when inlining this value into a diagnostic
    /// rendering of a query.
    ///
    /// **Warning**: text is quoted but not escaped. The output is for logs
    /// only and must never be executed.
    #[must_use]
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int8(n) => n.to_string(),
            Self::Int16(n) => n.to_string(),
            Self::Int32(n) => n.to_string(),
            Self::Int64(n) => n.to_string(),
            Self::Float32(f) => f.to_string(),
            Self::Float64(f) => f.to_string(),
            Self::Text(s) => format!("'{s}'"),
            Self::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Int8(n) => Some(i64::from(*n)),
            Self::Int16(n) => Some(i64::from(*n)),
            Self::Int32(n) => Some(i64::from(*n)),
            Self::Int64(n) => Some(*n),
            _ => None,
        }
    }

    fn as_text_bytes(&self) -> Option<&str> {
        match self {
            Self::Bytes(b) => std::str::from_utf8(b).ok().map(str::trim),
            _ => None,
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToSqlValue {
    /// Converts the value to a `SqlValue`.
    fn to_sql_value(self) -> SqlValue;
}

impl ToSqlValue for SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self
    }
}

impl ToSqlValue for &SqlValue {
    fn to_sql_value(self) -> SqlValue {
        self.clone()
    }
}

impl ToSqlValue for bool {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bool(self)
    }
}

impl ToSqlValue for i8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int8(self)
    }
}

impl ToSqlValue for i16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int16(self)
    }
}

impl ToSqlValue for i32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int32(self)
    }
}

impl ToSqlValue for i64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int64(self)
    }
}

impl ToSqlValue for u8 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int16(i16::from(self))
    }
}

impl ToSqlValue for u16 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int32(i32::from(self))
    }
}

impl ToSqlValue for u32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Int64(i64::from(self))
    }
}

impl ToSqlValue for f32 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float32(self)
    }
}

impl ToSqlValue for f64 {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Float64(self)
    }
}

impl ToSqlValue for String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self)
    }
}

impl ToSqlValue for &str {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(String::from(self))
    }
}

impl ToSqlValue for &String {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl<T: ToSqlValue> ToSqlValue for Option<T> {
    fn to_sql_value(self) -> SqlValue {
        match self {
            Some(v) => v.to_sql_value(),
            None => SqlValue::Null,
        }
    }
}

impl ToSqlValue for Vec<u8> {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bytes(self)
    }
}

impl ToSqlValue for &[u8] {
    fn to_sql_value(self) -> SqlValue {
        SqlValue::Bytes(self.to_vec())
    }
}

/// Trait for types that can be read out of a `SqlValue`.
///
/// `from_sql_value` returns `None` when the stored kind lies outside the
/// type's coercion set; callers attach the column name to build the error.
pub trait FromSqlValue: Sized {
    /// Name of the target type, reported in conversion errors.
    const TYPE_NAME: &'static str;

    /// Attempts the coercion.
    fn from_sql_value(value: &SqlValue) -> Option<Self>;
}

impl FromSqlValue for SqlValue {
    const TYPE_NAME: &'static str = "SqlValue";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromSqlValue for i64 {
    const TYPE_NAME: &'static str = "i64";

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        // Floats truncate toward zero; anything outside i64 is rejected.
        let from_float = |f: f64| {
            let t = f.trunc();
            (f.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
        };
        match value {
            SqlValue::Float32(f) => from_float(f64::from(*f)),
            SqlValue::Float64(f) => from_float(*f),
            SqlValue::Bytes(_) => value.as_text_bytes()?.parse().ok(),
            other => other.as_integer(),
        }
    }
}

macro_rules! impl_from_sql_value_narrow_int {
    ($($ty:ty),+) => {
        $(
            impl FromSqlValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_sql_value(value: &SqlValue) -> Option<Self> {
                    i64::from_sql_value(value).and_then(|n| <$ty>::try_from(n).ok())
                }
            }
        )+
    };
}

impl_from_sql_value_narrow_int!(i32, i16, i8);

impl FromSqlValue for f64 {
    const TYPE_NAME: &'static str = "f64";

    #[allow(clippy::cast_precision_loss)]
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float32(f) => Some(Self::from(*f)),
            SqlValue::Float64(f) => Some(*f),
            SqlValue::Bytes(_) => value.as_text_bytes()?.parse().ok(),
            other => other.as_integer().map(|n| n as Self),
        }
    }
}

impl FromSqlValue for f32 {
    const TYPE_NAME: &'static str = "f32";

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Float32(f) => Some(*f),
            SqlValue::Float64(f) => Some(*f as Self),
            SqlValue::Bytes(_) => value.as_text_bytes()?.parse().ok(),
            other => other.as_integer().map(|n| n as Self),
        }
    }
}

impl FromSqlValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bool(b) => Some(*b),
            SqlValue::Float32(f) => Some(*f != 0.0),
            SqlValue::Float64(f) => Some(*f != 0.0),
            SqlValue::Bytes(_) => {
                let text = value.as_text_bytes()?;
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    text.parse::<i64>().ok().map(|n| n != 0)
                }
            }
            other => other.as_integer().map(|n| n != 0),
        }
    }
}

impl FromSqlValue for String {
    const TYPE_NAME: &'static str = "String";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Null => None,
            SqlValue::Bool(b) => Some(b.to_string()),
            SqlValue::Float32(f) => Some(f.to_string()),
            SqlValue::Float64(f) => Some(f.to_string()),
            SqlValue::Text(s) => Some(s.clone()),
            SqlValue::Bytes(b) => Self::from_utf8(b.clone()).ok(),
            other => other.as_integer().map(|n| n.to_string()),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    const TYPE_NAME: &'static str = "Vec<u8>";

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        match value {
            SqlValue::Bytes(b) => Some(b.clone()),
            SqlValue::Text(s) => Some(s.clone().into_bytes()),
            _ => None,
        }
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    const TYPE_NAME: &'static str = T::TYPE_NAME;

    fn from_sql_value(value: &SqlValue) -> Option<Self> {
        if value.is_null() {
            Some(None)
        } else {
            T::from_sql_value(value).map(Some)
        }
    }
}
