//! Resolution of named bindings into positional SQL.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::parser::NamedParameterIndex;
use crate::value::SqlValue;

/// The positional placeholder emitted for every named occurrence.
pub const PLACEHOLDER: &str = "?";

/// Output of a successful compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Query text with every occurrence replaced by [`PLACEHOLDER`].
    pub sql: String,
    /// Arguments in placeholder order.
    pub args: Vec<SqlValue>,
    /// Byte offset of each placeholder in `sql`, ascending.
    pub slots: Vec<usize>,
}

/// Rewrites `query`, replacing every indexed occurrence with a positional
/// placeholder. Returns the new text and the placeholder offsets.
#[must_use]
pub fn rewrite(query: &str, index: &NamedParameterIndex) -> (String, Vec<usize>) {
    let mut sql = String::with_capacity(query.len());
    let mut slots = Vec::with_capacity(index.total());
    let mut last = 0;

    for placeholder in index.placeholders() {
        sql.push_str(&query[last..placeholder.span.start]);
        slots.push(sql.len());
        sql.push_str(PLACEHOLDER);
        last = placeholder.span.end;
    }
    sql.push_str(&query[last..]);

    (sql, slots)
}

/// Compiles named `bindings` against `index`.
///
/// The last value bound for a name wins. The distinct bound names must equal
/// the distinct names in the query; otherwise `ParameterMismatch` is returned
/// and nothing else is produced.
pub fn compile(
    query: &str,
    index: &NamedParameterIndex,
    bindings: &[(String, SqlValue)],
) -> Result<Compiled> {
    let mut resolved: BTreeMap<&str, &SqlValue> = BTreeMap::new();
    for (name, value) in bindings {
        resolved.insert(name.as_str(), value);
    }

    let missing: Vec<String> = index
        .names()
        .filter(|name| !resolved.contains_key(name))
        .map(String::from)
        .collect();
    let unexpected: Vec<String> = resolved
        .keys()
        .filter(|name| !index.contains(name))
        .map(|name| (*name).to_string())
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(Error::ParameterMismatch {
            missing,
            unexpected,
        });
    }

    // Every occurrence name is in `resolved` after the check above.
    let args = index
        .placeholders()
        .iter()
        .filter_map(|p| resolved.get(p.name.as_str()).map(|v| (*v).clone()))
        .collect();
    let (sql, slots) = rewrite(query, index);

    Ok(Compiled { sql, args, slots })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ParamStyle;

    fn bind(pairs: &[(&str, SqlValue)]) -> Vec<(String, SqlValue)> {
        pairs
            .iter()
            .map(|(n, v)| ((*n).to_string(), v.clone()))
            .collect()
    }

    fn run(query: &str, pairs: &[(&str, SqlValue)]) -> Result<Compiled> {
        let index = NamedParameterIndex::parse(query, ParamStyle::default());
        compile(query, &index, &bind(pairs))
    }

    #[test]
    fn test_compile_two_names() {
        let compiled = run(
            "SELECT * FROM Foo WHERE id = :a: AND bar = :b:",
            &[("a", SqlValue::Int64(5)), ("b", SqlValue::Int64(7))],
        )
        .unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM Foo WHERE id = ? AND bar = ?");
        assert_eq!(compiled.args, vec![SqlValue::Int64(5), SqlValue::Int64(7)]);
        assert_eq!(compiled.slots, vec![29, 41]);
    }

    #[test]
    fn test_compile_follows_text_order_not_bind_order() {
        let compiled = run(
            "SELECT * FROM Foo WHERE id=:b: AND bar=:a:",
            &[("a", SqlValue::Int64(1)), ("b", SqlValue::Int64(2))],
        )
        .unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM Foo WHERE id=? AND bar=?");
        assert_eq!(compiled.args, vec![SqlValue::Int64(2), SqlValue::Int64(1)]);
    }

    #[test]
    fn test_compile_repeated_name() {
        let compiled = run(
            "SELECT * FROM Foo WHERE id = :a: AND foo = :a:",
            &[("a", SqlValue::Int64(5))],
        )
        .unwrap();
        assert_eq!(compiled.sql, "SELECT * FROM Foo WHERE id = ? AND foo = ?");
        assert_eq!(compiled.args, vec![SqlValue::Int64(5), SqlValue::Int64(5)]);
    }

    #[test]
    fn test_last_binding_wins() {
        let compiled = run(
            "DELETE FROM t WHERE id = :id:",
            &[("id", SqlValue::Int64(1)), ("id", SqlValue::Int64(9))],
        )
        .unwrap();
        assert_eq!(compiled.args, vec![SqlValue::Int64(9)]);
    }

    #[test]
    fn test_missing_binding_is_mismatch() {
        let err = run(
            "SELECT * FROM Foo WHERE id = :a: AND bar = :b:",
            &[("a", SqlValue::Int64(5))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::ParameterMismatch {
                missing: vec![String::from("b")],
                unexpected: vec![],
            }
        );
    }

    #[test]
    fn test_unknown_binding_is_mismatch() {
        let err = run(
            "SELECT * FROM Foo WHERE id=:a AND bar=:b:",
            &[("a", SqlValue::Int64(1)), ("b", SqlValue::Int64(2))],
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::ParameterMismatch {
                missing: vec![],
                unexpected: vec![String::from("a")],
            }
        );
    }

    #[test]
    fn test_literal_markers_survive_rewrite() {
        let compiled = run("SELECT ':x :' , x::int FROM t WHERE a = :a:", &[("a", SqlValue::Null)]).unwrap();
        assert_eq!(compiled.sql, "SELECT ':x :' , x::int FROM t WHERE a = ?");
        assert_eq!(compiled.args, vec![SqlValue::Null]);
    }

    #[test]
    fn test_no_parameters_no_bindings() {
        let compiled = run("SELECT 1", &[]).unwrap();
        assert_eq!(compiled.sql, "SELECT 1");
        assert!(compiled.args.is_empty());
        assert!(compiled.slots.is_empty());
    }

    #[test]
    fn test_compile_is_idempotent() {
        let pairs = [("a", SqlValue::Text(String::from("x"))), ("b", SqlValue::Float64(0.5))];
        let query = "UPDATE t SET a = :a:, b = :b: WHERE a <> :a:";
        assert_eq!(run(query, &pairs).unwrap(), run(query, &pairs).unwrap());
    }
}
