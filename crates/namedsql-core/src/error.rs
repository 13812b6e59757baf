//! Error types for statement compilation and row access.

use thiserror::Error;

/// Errors raised by the binding and materialization layer.
///
/// Driver errors never pass through this type; execution collaborators keep
/// them in their own error enums untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The bound parameter names differ from the names found in the query.
    #[error(
        "parameter mismatch: missing bindings [{}], unexpected bindings [{}]",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    ParameterMismatch {
        /// Names present in the query that were never bound.
        missing: Vec<String>,
        /// Names that were bound but do not occur in the query.
        unexpected: Vec<String>,
    },

    /// Named and positional arguments were bound on the same statement.
    #[error("cannot mix named and positional bindings on one statement")]
    MixedBindings,

    /// A typed accessor referenced a column the row does not have.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// The stored value cannot be coerced into the requested type.
    #[error("cannot convert column '{column}' from {kind} to {target}")]
    CannotConvert {
        /// Column holding the value.
        column: String,
        /// Kind of the stored value.
        kind: &'static str,
        /// Requested Rust type.
        target: &'static str,
    },

    /// The result cursor was already consumed or closed.
    #[error("result set is closed")]
    ResultClosed,
}

/// Result type alias for binding and row operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_message_lists_names() {
        let err = Error::ParameterMismatch {
            missing: vec![String::from("b")],
            unexpected: vec![String::from("c"), String::from("d")],
        };
        assert_eq!(
            err.to_string(),
            "parameter mismatch: missing bindings [b], unexpected bindings [c, d]"
        );
    }

    #[test]
    fn test_cannot_convert_message() {
        let err = Error::CannotConvert {
            column: String::from("name"),
            kind: "TEXT",
            target: "i64",
        };
        assert_eq!(err.to_string(), "cannot convert column 'name' from TEXT to i64");
    }
}
