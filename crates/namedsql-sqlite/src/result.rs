//! Results of executed statements.

use std::time::Duration;

use futures::TryStreamExt;
use namedsql_core::{
    CompiledStatement, Error, Record, ResultSet, Row, RowCursor, Rows, SqlValue,
};
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteConnection;
use sqlx::Sqlite;

use crate::driver::{self, RowStream};
use crate::error::{DbError, Result};

/// A cursor that pulls rows from a running SQLite statement one at a time.
pub struct SqliteCursor<'c> {
    columns: Vec<String>,
    rows: Option<RowStream<'c>>,
}

impl<'c> SqliteCursor<'c> {
    pub(crate) const fn new(columns: Vec<String>, rows: RowStream<'c>) -> Self {
        Self {
            columns,
            rows: Some(rows),
        }
    }
}

impl std::fmt::Debug for SqliteCursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteCursor")
            .field("columns", &self.columns)
            .field("open", &self.rows.is_some())
            .finish()
    }
}

impl RowCursor for SqliteCursor<'_> {
    type Error = DbError;

    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self, buffer: &mut [SqlValue]) -> Result<bool> {
        let Some(rows) = self.rows.as_mut() else {
            return Ok(false);
        };
        match rows.try_next().await? {
            Some(row) => {
                driver::decode_row(&row, buffer)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn close(&mut self) -> Result<()> {
        // Dropping the stream resets the statement.
        self.rows = None;
        Ok(())
    }
}

/// The connection a query runs on.
enum Handle<'c> {
    Pooled(PoolConnection<Sqlite>),
    Borrowed(&'c mut SqliteConnection),
}

impl Handle<'_> {
    fn connection(&mut self) -> &mut SqliteConnection {
        match self {
            Self::Pooled(conn) => &mut **conn,
            Self::Borrowed(conn) => &mut **conn,
        }
    }
}

/// A validated query waiting to be read, together with the statement that
/// produced it.
///
/// Nothing is stepped until a fetch. Rows are then pulled one at a time, so
/// [`QueryResult::fetch_one`] never evaluates a second row. The rows can be
/// fetched once; a second fetch fails with `ResultClosed`. The connection is
/// held until the result is fetched, closed or dropped.
pub struct QueryResult<'c> {
    statement: CompiledStatement,
    columns: Vec<String>,
    handle: Option<Handle<'c>>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for QueryResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryResult")
            .field("statement", &self.statement)
            .field("columns", &self.columns)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl QueryResult<'static> {
    pub(crate) const fn pooled(
        statement: CompiledStatement,
        columns: Vec<String>,
        conn: PoolConnection<Sqlite>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            statement,
            columns,
            handle: Some(Handle::Pooled(conn)),
            timeout,
        }
    }
}

impl<'c> QueryResult<'c> {
    pub(crate) fn borrowed(
        statement: CompiledStatement,
        columns: Vec<String>,
        conn: &'c mut SqliteConnection,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            statement,
            columns,
            handle: Some(Handle::Borrowed(conn)),
            timeout,
        }
    }

    /// Returns the column names in result order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true once the rows have been fetched or closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.handle.is_none()
    }

    fn take_handle(&mut self) -> Result<Handle<'c>> {
        self.handle.take().ok_or(DbError::Core(Error::ResultClosed))
    }

    /// Fetches every row.
    ///
    /// # Errors
    ///
    /// `ResultClosed` on a second fetch, `Timeout` if the configured limit is
    /// exceeded, or the first driver error while stepping or decoding.
    pub async fn fetch_all(&mut self) -> Result<Rows> {
        let mut handle = self.take_handle()?;
        let stream = driver::fetch(handle.connection(), &self.statement);
        let mut rows = ResultSet::new(SqliteCursor::new(self.columns.clone(), stream));
        driver::with_timeout(self.timeout, rows.fetch_all()).await
    }

    /// Fetches the first row, or an empty row if there are none. Later rows
    /// are never evaluated.
    ///
    /// # Errors
    ///
    /// `ResultClosed` on a second fetch, `Timeout` if the configured limit is
    /// exceeded, or a driver error while producing the first row.
    pub async fn fetch_one(&mut self) -> Result<Row> {
        let mut handle = self.take_handle()?;
        let stream = driver::fetch_first(handle.connection(), &self.statement);
        let mut rows = ResultSet::new(SqliteCursor::new(self.columns.clone(), stream));
        driver::with_timeout(self.timeout, rows.fetch_one()).await
    }

    /// Decodes every row into `T`.
    ///
    /// # Errors
    ///
    /// `ResultClosed` on a second fetch, `CannotConvert` if a column does
    /// not fit its field, `Timeout` if the configured limit is exceeded, or
    /// a driver error while stepping or decoding.
    pub async fn fetch_typed<T: Record + Send>(&mut self) -> Result<Vec<T>> {
        let mut handle = self.take_handle()?;
        let stream = driver::fetch(handle.connection(), &self.statement);
        let mut rows = ResultSet::new(SqliteCursor::new(self.columns.clone(), stream));
        driver::with_timeout(self.timeout, rows.fetch_typed()).await
    }

    /// Releases the connection without reading any rows. Closing twice is
    /// a no-op.
    pub fn close(&mut self) {
        self.handle = None;
    }

    /// Returns the compiled statement.
    #[must_use]
    pub const fn statement(&self) -> &CompiledStatement {
        &self.statement
    }

    /// Renders the executed SQL with its arguments inlined, for logs.
    #[must_use]
    pub fn last_executed_query(&self) -> String {
        self.statement.last_executed_query()
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecResult {
    statement: CompiledStatement,
    rows_affected: u64,
    last_insert_id: i64,
}

impl ExecResult {
    pub(crate) const fn new(
        statement: CompiledStatement,
        rows_affected: u64,
        last_insert_id: i64,
    ) -> Self {
        Self {
            statement,
            rows_affected,
            last_insert_id,
        }
    }

    /// Returns the number of rows changed.
    #[must_use]
    pub const fn rows_affected(&self) -> u64 {
        self.rows_affected
    }

    /// Returns the rowid of the last inserted row on this connection.
    #[must_use]
    pub const fn last_insert_id(&self) -> i64 {
        self.last_insert_id
    }

    /// Returns the compiled statement.
    #[must_use]
    pub const fn statement(&self) -> &CompiledStatement {
        &self.statement
    }

    /// Renders the executed SQL with its arguments inlined, for logs.
    #[must_use]
    pub fn last_executed_query(&self) -> String {
        self.statement.last_executed_query()
    }
}
