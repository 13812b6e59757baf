//! Statements, bindings and their compiled form.
//!
//! A [`Statement`] owns the raw query text and the caller's pending bindings.
//! Compiling it yields a [`CompiledStatement`], an immutable value holding the
//! positional SQL and argument list handed to the driver. Diagnostic
//! rendering only exists on the compiled form.
//!
//! ```rust
//! use namedsql_core::{SqlValue, Statement};
//!
//! let mut stmt = Statement::new("SELECT * FROM Foo WHERE id = :a: AND bar = :b:");
//! stmt.bind_named("a", 5).bind_named("b", 7);
//!
//! let compiled = stmt.compile().unwrap();
//! assert_eq!(compiled.sql(), "SELECT * FROM Foo WHERE id = ? AND bar = ?");
//! assert_eq!(compiled.args(), &[SqlValue::Int32(5), SqlValue::Int32(7)]);
//! assert_eq!(
//!     compiled.last_executed_query(),
//!     "SELECT * FROM Foo WHERE id = 5 AND bar = 7"
//! );
//! ```

use tracing::debug;

use crate::compiler;
use crate::config::BindConfig;
use crate::error::{Error, Result};
use crate::parser::{NamedParameterIndex, ParamStyle};
use crate::render;
use crate::value::{SqlValue, ToSqlValue};

/// Binding state of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementState {
    /// Nothing bound yet.
    Unbound,
    /// At least one named value bound.
    NamedBound,
    /// At least one positional value bound.
    PositionalBound,
}

/// A query and its pending bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    query: String,
    style: ParamStyle,
    index: NamedParameterIndex,
    named: Vec<(String, SqlValue)>,
    positional: Vec<SqlValue>,
}

impl Statement {
    /// Creates a statement using the default `:name:` grammar.
    pub fn new(query: impl Into<String>) -> Self {
        Self::with_style(query, ParamStyle::default())
    }

    /// Creates a statement using the given grammar.
    pub fn with_style(query: impl Into<String>, style: ParamStyle) -> Self {
        let query = query.into();
        let index = NamedParameterIndex::parse(&query, style);
        Self {
            query,
            style,
            index,
            named: Vec::new(),
            positional: Vec::new(),
        }
    }

    /// Creates a statement using the grammar from `config`.
    pub fn with_config(query: impl Into<String>, config: &BindConfig) -> Self {
        Self::with_style(query, config.param_style)
    }

    /// Returns the raw query text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the grammar the query was scanned with.
    #[must_use]
    pub const fn style(&self) -> ParamStyle {
        self.style
    }

    /// Returns the named-parameter index of the query.
    #[must_use]
    pub const fn index(&self) -> &NamedParameterIndex {
        &self.index
    }

    /// Returns true if the query contains named parameters.
    #[must_use]
    pub fn is_parameterized(&self) -> bool {
        !self.index.is_empty()
    }

    /// Returns the query with named occurrences replaced by positional
    /// placeholders, without resolving any bindings.
    #[must_use]
    pub fn positional_sql(&self) -> String {
        compiler::rewrite(&self.query, &self.index).0
    }

    /// Returns the current binding state.
    #[must_use]
    pub fn state(&self) -> StatementState {
        if !self.named.is_empty() {
            StatementState::NamedBound
        } else if !self.positional.is_empty() {
            StatementState::PositionalBound
        } else {
            StatementState::Unbound
        }
    }

    /// Binds a value to a named parameter. Rebinding a name replaces the
    /// earlier value at compile time.
    pub fn bind_named(&mut self, name: impl Into<String>, value: impl ToSqlValue) -> &mut Self {
        self.named.push((name.into(), value.to_sql_value()));
        self
    }

    /// Binds several named values in order.
    pub fn bind_named_batch<I, N, V>(&mut self, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: ToSqlValue,
    {
        self.named.extend(
            bindings
                .into_iter()
                .map(|(name, value)| (name.into(), value.to_sql_value())),
        );
        self
    }

    /// Appends a positional argument for queries written with native
    /// placeholders.
    pub fn bind_positional(&mut self, value: impl ToSqlValue) -> &mut Self {
        self.positional.push(value.to_sql_value());
        self
    }

    /// Appends several positional arguments in order.
    pub fn bind_positional_batch<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: ToSqlValue,
    {
        self.positional
            .extend(values.into_iter().map(ToSqlValue::to_sql_value));
        self
    }

    /// Returns the named bindings in bind order, duplicates included.
    #[must_use]
    pub fn named_bindings(&self) -> &[(String, SqlValue)] {
        &self.named
    }

    /// Returns the positional bindings.
    #[must_use]
    pub fn positional_bindings(&self) -> &[SqlValue] {
        &self.positional
    }

    /// Drops every binding, returning the statement to `Unbound`.
    pub fn clear_bindings(&mut self) {
        self.named.clear();
        self.positional.clear();
    }

    /// Compiles the statement into positional form.
    ///
    /// Positional bindings bypass named compilation and send the text as
    /// written. Otherwise the named bindings must cover exactly the names in
    /// the query.
    ///
    /// # Errors
    ///
    /// `ParameterMismatch` when the bound and discovered name sets differ,
    /// `MixedBindings` when both kinds of binding are present.
    pub fn compile(&self) -> Result<CompiledStatement> {
        let compiled = match (self.named.is_empty(), self.positional.is_empty()) {
            (false, false) => return Err(Error::MixedBindings),
            (true, false) => compiler::Compiled {
                sql: self.query.clone(),
                args: self.positional.clone(),
                slots: render::scan_slots(&self.query),
            },
            (true, true) if self.index.is_empty() => compiler::Compiled {
                sql: self.query.clone(),
                args: Vec::new(),
                slots: Vec::new(),
            },
            _ => compiler::compile(&self.query, &self.index, &self.named)?,
        };

        debug!(
            sql = %compiled.sql,
            args = compiled.args.len(),
            "Compiled statement"
        );

        Ok(CompiledStatement {
            source: self.query.clone(),
            sql: compiled.sql,
            args: compiled.args,
            slots: compiled.slots,
            named: self.named.clone(),
        })
    }
}

/// A statement ready for the driver: positional SQL plus ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    source: String,
    sql: String,
    args: Vec<SqlValue>,
    slots: Vec<usize>,
    named: Vec<(String, SqlValue)>,
}

impl CompiledStatement {
    /// Returns the positional SQL.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Returns the arguments in placeholder order.
    #[must_use]
    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    /// Returns the query text the statement was created from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the named bindings the statement was compiled with.
    #[must_use]
    pub fn named_bindings(&self) -> &[(String, SqlValue)] {
        &self.named
    }

    /// Renders the SQL with arguments inlined, for logs only.
    #[must_use]
    pub fn last_executed_query(&self) -> String {
        render::render(&self.sql, &self.slots, &self.args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_statement_is_unbound() {
        let stmt = Statement::new("SELECT * FROM Foo WHERE 1=:id:");
        assert_eq!(stmt.state(), StatementState::Unbound);
        assert!(stmt.is_parameterized());
        assert!(!Statement::new("SELECT * FROM Foo WHERE 1=?").is_parameterized());
        assert!(!Statement::new("SELECT * FROM Foo WHERE 1 = :id").is_parameterized());
        assert!(!Statement::new("SELECT * FROM Foo WHERE 1=id:").is_parameterized());
    }

    #[test]
    fn test_state_transitions() {
        let mut stmt = Statement::new("SELECT :a:");
        stmt.bind_named("a", 1);
        assert_eq!(stmt.state(), StatementState::NamedBound);
        stmt.clear_bindings();
        assert_eq!(stmt.state(), StatementState::Unbound);
        stmt.bind_positional(1);
        assert_eq!(stmt.state(), StatementState::PositionalBound);
    }

    #[test]
    fn test_compile_named() {
        let mut stmt = Statement::new("SELECT * FROM Foo WHERE id = :a: AND bar = :b:");
        stmt.bind_named_batch([("a", 5_i64), ("b", 7_i64)]);
        let compiled = stmt.compile().unwrap();
        assert_eq!(compiled.sql(), "SELECT * FROM Foo WHERE id = ? AND bar = ?");
        assert_eq!(compiled.args(), &[SqlValue::Int64(5), SqlValue::Int64(7)]);
        assert_eq!(compiled.source(), stmt.query());
        assert_eq!(compiled.named_bindings().len(), 2);
        assert_eq!(
            compiled.last_executed_query(),
            "SELECT * FROM Foo WHERE id = 5 AND bar = 7"
        );
    }

    #[test]
    fn test_failed_compile_keeps_bindings() {
        let mut stmt = Statement::new("SELECT * FROM Foo WHERE id = :a: AND bar = :b:");
        stmt.bind_named("a", 5);
        assert!(matches!(
            stmt.compile(),
            Err(Error::ParameterMismatch { .. })
        ));
        assert_eq!(stmt.state(), StatementState::NamedBound);

        stmt.bind_named("b", 7);
        assert!(stmt.compile().is_ok());
    }

    #[test]
    fn test_parameterized_without_bindings_is_mismatch() {
        let stmt = Statement::new("SELECT * FROM Foo WHERE id = :a:");
        assert_eq!(
            stmt.compile().unwrap_err(),
            Error::ParameterMismatch {
                missing: vec![String::from("a")],
                unexpected: vec![],
            }
        );
    }

    #[test]
    fn test_named_binding_on_plain_query_is_mismatch() {
        let mut stmt = Statement::new("SELECT 1");
        stmt.bind_named("a", 1);
        assert!(matches!(
            stmt.compile(),
            Err(Error::ParameterMismatch { unexpected, .. }) if unexpected == vec![String::from("a")]
        ));
    }

    #[test]
    fn test_positional_passthrough() {
        let mut stmt = Statement::new("SELECT * FROM Foo WHERE id = ? AND name = ?");
        stmt.bind_positional_batch([SqlValue::Int64(3), SqlValue::Text(String::from("x"))]);
        let compiled = stmt.compile().unwrap();
        assert_eq!(compiled.sql(), stmt.query());
        assert_eq!(compiled.args().len(), 2);
        assert_eq!(
            compiled.last_executed_query(),
            "SELECT * FROM Foo WHERE id = 3 AND name = 'x'"
        );
    }

    #[test]
    fn test_mixed_bindings_rejected() {
        let mut stmt = Statement::new("SELECT :a:, ?");
        stmt.bind_named("a", 1).bind_positional(2);
        assert_eq!(stmt.compile().unwrap_err(), Error::MixedBindings);
    }

    #[test]
    fn test_plain_query_without_bindings() {
        let compiled = Statement::new("SELECT 1").compile().unwrap();
        assert_eq!(compiled.sql(), "SELECT 1");
        assert!(compiled.args().is_empty());
        assert_eq!(compiled.last_executed_query(), "SELECT 1");
    }

    #[test]
    fn test_sigil_statement() {
        let mut stmt = Statement::with_style(
            "SELECT * FROM Test WHERE IntCol <> @intCol AND StringCol = @strCol AND StringCol <> @intCol",
            ParamStyle::Sigil('@'),
        );
        stmt.bind_named("intCol", 11).bind_named("strCol", "good bye");
        let compiled = stmt.compile().unwrap();
        assert_eq!(
            compiled.sql(),
            "SELECT * FROM Test WHERE IntCol <> ? AND StringCol = ? AND StringCol <> ?"
        );
        assert_eq!(
            compiled.last_executed_query(),
            "SELECT * FROM Test WHERE IntCol <> 11 AND StringCol = 'good bye' AND StringCol <> 11"
        );
    }

    #[test]
    fn test_positional_sql() {
        let stmt = Statement::new("UPDATE t SET a = :a: WHERE id = :id:");
        assert_eq!(stmt.positional_sql(), "UPDATE t SET a = ? WHERE id = ?");
    }

    #[test]
    fn test_rendering_tolerates_question_marks_in_literals() {
        let mut stmt = Statement::new("SELECT '?' AS q FROM t WHERE id = :id:");
        stmt.bind_named("id", 4);
        let compiled = stmt.compile().unwrap();
        assert_eq!(
            compiled.last_executed_query(),
            "SELECT '?' AS q FROM t WHERE id = 4"
        );
    }
}
