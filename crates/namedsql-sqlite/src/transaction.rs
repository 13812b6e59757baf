//! Transactions.

use namedsql_core::{Row, Statement};
use sqlx::Sqlite;
use tracing::debug;

use crate::config::DatabaseConfig;
use crate::driver;
use crate::error::Result;
use crate::result::{ExecResult, QueryResult};

/// A transaction on one pooled connection.
///
/// Dropping it without calling [`Transaction::commit`] rolls it back.
pub struct Transaction {
    inner: sqlx::Transaction<'static, Sqlite>,
    config: DatabaseConfig,
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Transaction {
    pub(crate) const fn new(inner: sqlx::Transaction<'static, Sqlite>, config: DatabaseConfig) -> Self {
        Self { inner, config }
    }

    /// Creates a statement using the configured parameter grammar.
    #[must_use]
    pub fn statement(&self, query: impl Into<String>) -> Statement {
        Statement::with_config(query, &self.config.bind_config())
    }

    /// Compiles and executes a statement inside the transaction.
    ///
    /// # Errors
    ///
    /// `Core` if the bindings do not match the query, `Timeout` if the
    /// configured limit is exceeded, otherwise the driver error.
    pub async fn exec(&mut self, statement: &Statement) -> Result<ExecResult> {
        let compiled = statement.compile()?;
        driver::with_timeout(
            self.config.statement_timeout,
            driver::execute(&mut self.inner, compiled),
        )
        .await
    }

    /// Compiles a query and has the driver validate it. The transaction is
    /// borrowed until the result is fetched, closed or dropped.
    ///
    /// # Errors
    ///
    /// See [`Transaction::exec`].
    pub async fn query(&mut self, statement: &Statement) -> Result<QueryResult<'_>> {
        let compiled = statement.compile()?;
        let timeout = self.config.statement_timeout;
        let columns = driver::with_timeout(
            timeout,
            driver::describe_columns(&mut self.inner, compiled.sql()),
        )
        .await?;
        Ok(QueryResult::borrowed(compiled, columns, &mut self.inner, timeout))
    }

    /// Runs a query and returns its first row, or an empty row. Only the
    /// first row is evaluated.
    ///
    /// # Errors
    ///
    /// See [`Transaction::exec`].
    pub async fn query_row(&mut self, statement: &Statement) -> Result<Row> {
        self.query(statement).await?.fetch_one().await
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Any driver error raised while committing.
    pub async fn commit(self) -> Result<()> {
        self.inner.commit().await?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Rolls the transaction back.
    ///
    /// # Errors
    ///
    /// Any driver error raised while rolling back.
    pub async fn rollback(self) -> Result<()> {
        self.inner.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }
}
