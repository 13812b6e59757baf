//! Discovery of named-parameter occurrences in raw query text.
//!
//! Two grammars are supported and exactly one is active for a given
//! statement:
//!
//! - **Delimited** (`:name:`): an opening marker, a non-empty name and a
//!   closing marker with no whitespace in between. An opening marker that
//!   reaches whitespace or the end of the text before a closing marker is
//!   literal text, as is a doubled marker (`::`).
//! - **Sigil** (`@name`): a marker followed by a name running up to the next
//!   whitespace or the end of the text.
//!
//! Unrecognized markers are never an error. The scan does not understand SQL
//! quoting, so a marker inside a string literal is treated like any other.
//!
//! ```rust
//! use namedsql_core::parser::{NamedParameterIndex, ParamStyle};
//!
//! let index = NamedParameterIndex::parse(
//!     "SELECT * FROM Foo WHERE id = :a: AND bar = :b: AND foo = :a:",
//!     ParamStyle::default(),
//! );
//! assert_eq!(index.total(), 3);
//! assert_eq!(index.positions("a"), Some(&[0, 2][..]));
//! assert_eq!(index.positions("b"), Some(&[1][..]));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::span::Span;

/// The delimiter grammar used to recognize named parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamStyle {
    /// `@name`: a leading marker, name ends at whitespace.
    Sigil(char),
    /// `:name:`: a name enclosed by two identical markers.
    Delimited(char),
}

impl ParamStyle {
    /// Returns the marker character.
    #[must_use]
    pub const fn marker(self) -> char {
        match self {
            Self::Sigil(c) | Self::Delimited(c) => c,
        }
    }
}

impl Default for ParamStyle {
    fn default() -> Self {
        Self::Delimited(':')
    }
}

/// A single occurrence of a named parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Parameter name without markers.
    pub name: String,
    /// Location of the occurrence, markers included.
    pub span: Span,
}

/// Name to ordinal-position index of the named parameters in a query.
///
/// Ordinals are zero-based positions in the left-to-right sequence of all
/// occurrences, so a name used twice owns two ordinals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedParameterIndex {
    positions: BTreeMap<String, Vec<usize>>,
    placeholders: Vec<Placeholder>,
}

impl NamedParameterIndex {
    /// Scans `query` with the given grammar.
    #[must_use]
    pub fn parse(query: &str, style: ParamStyle) -> Self {
        let placeholders = scan(query, style);
        let mut positions: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        for (ordinal, placeholder) in placeholders.iter().enumerate() {
            positions
                .entry(placeholder.name.clone())
                .or_default()
                .push(ordinal);
        }

        trace!(
            total = placeholders.len(),
            distinct = positions.len(),
            "Indexed named parameters"
        );

        Self {
            positions,
            placeholders,
        }
    }

    /// Returns the total number of occurrences.
    #[must_use]
    pub fn total(&self) -> usize {
        self.placeholders.len()
    }

    /// Returns true when the query has no named parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placeholders.is_empty()
    }

    /// Returns the ascending ordinals at which `name` occurs.
    #[must_use]
    pub fn positions(&self, name: &str) -> Option<&[usize]> {
        self.positions.get(name).map(Vec::as_slice)
    }

    /// Returns true if `name` occurs in the query.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Returns the distinct names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    /// Returns every occurrence in text order.
    #[must_use]
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }
}

fn scan(query: &str, style: ParamStyle) -> Vec<Placeholder> {
    let marker = style.marker();
    let marker_len = marker.len_utf8();
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = query[cursor..].find(marker) {
        let start = cursor + offset;
        let name_start = start + marker_len;
        let tail = &query[name_start..];

        let end = match style {
            ParamStyle::Sigil(_) => {
                let len = tail.find(char::is_whitespace).unwrap_or(tail.len());
                (len > 0).then_some((name_start + len, name_start + len))
            }
            ParamStyle::Delimited(_) => tail
                .find(|c: char| c == marker || c.is_whitespace())
                .filter(|&len| len > 0 && tail[len..].starts_with(marker))
                .map(|len| (name_start + len, name_start + len + marker_len)),
        };

        match end {
            Some((name_end, end)) => {
                found.push(Placeholder {
                    name: query[name_start..name_end].to_string(),
                    span: Span::new(start, end),
                });
                cursor = end;
            }
            None => cursor = name_start,
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(index: &NamedParameterIndex) -> Vec<&str> {
        index
            .placeholders()
            .iter()
            .map(|p| p.name.as_str())
            .collect()
    }

    #[test]
    fn test_delimited_simple() {
        let index = NamedParameterIndex::parse(
            "SELECT * FROM Foo WHERE id = :a: AND bar = :b:",
            ParamStyle::default(),
        );
        assert_eq!(index.total(), 2);
        assert_eq!(names(&index), vec!["a", "b"]);
        assert_eq!(index.positions("a"), Some(&[0][..]));
        assert_eq!(index.positions("b"), Some(&[1][..]));
    }

    #[test]
    fn test_delimited_repeated_names() {
        let index = NamedParameterIndex::parse(
            "SELECT * FROM Foo WHERE id = :b: AND bar = :a: AND foo = :b:",
            ParamStyle::default(),
        );
        assert_eq!(index.total(), 3);
        assert_eq!(index.positions("a"), Some(&[1][..]));
        assert_eq!(index.positions("b"), Some(&[0, 2][..]));
        assert_eq!(index.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_delimited_without_spaces() {
        let index =
            NamedParameterIndex::parse("WHERE id=:a: AND bar=:b:", ParamStyle::default());
        assert_eq!(names(&index), vec!["a", "b"]);
        assert_eq!(index.placeholders()[0].span, Span::new(9, 12));
    }

    #[test]
    fn test_delimited_whitespace_before_close_is_literal() {
        let index = NamedParameterIndex::parse("SELECT * FROM t WHERE f = :id :", ParamStyle::default());
        assert!(index.is_empty());
        assert_eq!(index.total(), 0);
    }

    #[test]
    fn test_delimited_unterminated_markers() {
        let style = ParamStyle::default();
        assert_eq!(
            names(&NamedParameterIndex::parse("WHERE id=:b: AND bar=:a", style)),
            vec!["b"]
        );
        assert_eq!(
            names(&NamedParameterIndex::parse("WHERE id=:b AND bar=:a:", style)),
            vec!["a"]
        );
        assert_eq!(
            names(&NamedParameterIndex::parse("WHERE id=:b: AND bar=a:", style)),
            vec!["b"]
        );
        assert_eq!(
            names(&NamedParameterIndex::parse("WHERE id=b: AND bar=:a:", style)),
            vec!["a"]
        );
        assert!(NamedParameterIndex::parse("WHERE 1 = :id", style).is_empty());
        assert!(NamedParameterIndex::parse("WHERE 1=id:", style).is_empty());
    }

    #[test]
    fn test_delimited_double_marker_is_not_a_parameter() {
        let index = NamedParameterIndex::parse("SELECT x::int FROM t", ParamStyle::default());
        assert!(index.is_empty());
    }

    #[test]
    fn test_sigil_names_run_to_whitespace() {
        let index = NamedParameterIndex::parse(
            "SELECT * FROM Test WHERE IntCol <> @intCol AND StringCol = @strCol",
            ParamStyle::Sigil('@'),
        );
        assert_eq!(names(&index), vec!["intCol", "strCol"]);
        assert_eq!(index.placeholders()[1].span.len(), "@strCol".len());
    }

    #[test]
    fn test_sigil_bare_marker_is_literal() {
        let index = NamedParameterIndex::parse("SELECT @ FROM t WHERE a = @a", ParamStyle::Sigil('@'));
        assert_eq!(names(&index), vec!["a"]);
    }

    #[test]
    fn test_multibyte_marker_and_text() {
        let index = NamedParameterIndex::parse("SELECT 'é' WHERE x = §name§", ParamStyle::Delimited('§'));
        assert_eq!(names(&index), vec!["name"]);
        let span = index.placeholders()[0].span;
        assert_eq!(span.slice("SELECT 'é' WHERE x = §name§"), Some("§name§"));
    }

    #[test]
    fn test_parse_is_deterministic() {
        let query = "UPDATE t SET a = :a:, b = :b: WHERE a = :a:";
        let first = NamedParameterIndex::parse(query, ParamStyle::default());
        let second = NamedParameterIndex::parse(query, ParamStyle::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_param_style_serde() {
        let style: ParamStyle = serde_json::from_str(r#"{"sigil":"@"}"#).unwrap();
        assert_eq!(style, ParamStyle::Sigil('@'));
        assert_eq!(style.marker(), '@');
        assert_eq!(ParamStyle::default(), ParamStyle::Delimited(':'));
    }
}
