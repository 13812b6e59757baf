//! Statements parsed and validated once, executed many times.

use std::time::Duration;

use namedsql_core::{NamedParameterIndex, Row, Statement, ToSqlValue};
use sqlx::sqlite::SqlitePool;

use crate::driver;
use crate::error::Result;
use crate::result::{ExecResult, QueryResult};

/// A query whose named parameters were indexed when it was prepared.
///
/// Bindings persist across runs. Rebinding a name replaces its value, and
/// [`PreparedStatement::clear_bindings`] starts over.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    statement: Statement,
    columns: Vec<String>,
    pool: SqlitePool,
    timeout: Option<Duration>,
}

impl PreparedStatement {
    pub(crate) const fn new(
        statement: Statement,
        columns: Vec<String>,
        pool: SqlitePool,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            statement,
            columns,
            pool,
            timeout,
        }
    }

    /// Returns the query text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        self.statement.query()
    }

    /// Returns the query with positional placeholders, as validated.
    #[must_use]
    pub fn positional_sql(&self) -> String {
        self.statement.positional_sql()
    }

    /// Returns the named-parameter index built at prepare time.
    #[must_use]
    pub const fn index(&self) -> &NamedParameterIndex {
        self.statement.index()
    }

    /// Returns the result columns reported by the driver. Empty for
    /// statements that return no rows.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Binds a value to a named parameter.
    pub fn bind_named(&mut self, name: impl Into<String>, value: impl ToSqlValue) -> &mut Self {
        self.statement.bind_named(name, value);
        self
    }

    /// Binds several named values in order.
    pub fn bind_named_batch<I, N, V>(&mut self, bindings: I) -> &mut Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: ToSqlValue,
    {
        self.statement.bind_named_batch(bindings);
        self
    }

    /// Drops every binding.
    pub fn clear_bindings(&mut self) {
        self.statement.clear_bindings();
    }

    /// Executes the statement with the current bindings.
    ///
    /// # Errors
    ///
    /// `Core` if the bindings do not match the query, `Timeout` if the
    /// configured limit is exceeded, otherwise the driver error.
    pub async fn exec(&self) -> Result<ExecResult> {
        let compiled = self.statement.compile()?;
        driver::with_timeout(self.timeout, async {
            let mut conn = self.pool.acquire().await?;
            driver::execute(&mut conn, compiled).await
        })
        .await
    }

    /// Binds the current values and returns the result, ready to fetch.
    /// The columns reported at prepare time are reused.
    ///
    /// # Errors
    ///
    /// See [`PreparedStatement::exec`].
    pub async fn query(&self) -> Result<QueryResult<'static>> {
        let compiled = self.statement.compile()?;
        let conn = driver::with_timeout(self.timeout, async { Ok(self.pool.acquire().await?) }).await?;
        Ok(QueryResult::pooled(
            compiled,
            self.columns.clone(),
            conn,
            self.timeout,
        ))
    }

    /// Runs the query and returns its first row, or an empty row. Only the
    /// first row is evaluated.
    ///
    /// # Errors
    ///
    /// See [`PreparedStatement::exec`].
    pub async fn query_row(&self) -> Result<Row> {
        self.query().await?.fetch_one().await
    }
}
