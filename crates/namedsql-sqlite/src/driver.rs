//! Conversion between core values and sqlx, and the raw execute/fetch calls
//! shared by the pool, transactions and prepared statements.

use std::future::Future;
use std::time::Duration;

use futures::future;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use namedsql_core::{CompiledStatement, SqlValue};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Column, Executor, Row, Sqlite, Statement as _, TypeInfo, ValueRef};
use tracing::debug;

use crate::error::{DbError, Result};
use crate::result::ExecResult;

/// Rows streamed from one running statement.
pub(crate) type RowStream<'e> = BoxStream<'e, std::result::Result<SqliteRow, sqlx::Error>>;

/// Binds a value to a query, keeping its width where SQLite has a codec.
fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Int8(i) => query.bind(*i),
        SqlValue::Int16(i) => query.bind(*i),
        SqlValue::Int32(i) => query.bind(*i),
        SqlValue::Int64(i) => query.bind(*i),
        SqlValue::Float32(f) => query.bind(*f),
        SqlValue::Float64(f) => query.bind(*f),
        SqlValue::Text(s) => query.bind(s.clone()),
        SqlValue::Bytes(b) => query.bind(b.clone()),
    }
}

fn bind_args<'q>(sql: &'q str, args: &[SqlValue]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    args.iter().fold(sqlx::query(sql), bind_value)
}

/// Scans one row into `buffer` using the storage class of each value.
pub(crate) fn decode_row(row: &SqliteRow, buffer: &mut [SqlValue]) -> Result<()> {
    for (i, slot) in buffer.iter_mut().enumerate() {
        let kind = {
            let raw = row.try_get_raw(i)?;
            if raw.is_null() {
                None
            } else {
                Some(raw.type_info().name().to_string())
            }
        };

        *slot = match kind.as_deref() {
            None => SqlValue::Null,
            Some("INTEGER") => SqlValue::Int64(row.try_get_unchecked(i)?),
            Some("REAL") => SqlValue::Float64(row.try_get_unchecked(i)?),
            Some("BLOB") => SqlValue::Bytes(row.try_get_unchecked(i)?),
            Some("BOOLEAN") => SqlValue::Bool(row.try_get_unchecked(i)?),
            Some(_) => SqlValue::Text(row.try_get_unchecked(i)?),
        };
    }
    Ok(())
}

/// Runs `fut`, failing with `Timeout` if it outlives `limit`.
pub(crate) async fn with_timeout<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DbError::Timeout(limit))?,
        None => fut.await,
    }
}

/// Returns the result columns the driver reports for `sql`.
pub(crate) async fn describe_columns(conn: &mut SqliteConnection, sql: &str) -> Result<Vec<String>> {
    let prepared = conn.prepare(sql).await?;
    Ok(prepared
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect())
}

/// Executes a compiled statement that returns no rows.
pub(crate) async fn execute(
    conn: &mut SqliteConnection,
    statement: CompiledStatement,
) -> Result<ExecResult> {
    debug!(sql = %statement.sql(), args = statement.args().len(), "Executing statement");

    let done = bind_args(statement.sql(), statement.args())
        .execute(&mut *conn)
        .await?;

    Ok(ExecResult::new(
        statement,
        done.rows_affected(),
        done.last_insert_rowid(),
    ))
}

/// Streams the rows of a compiled query. Dropping the stream stops and
/// resets the statement.
pub(crate) fn fetch<'e>(
    conn: &'e mut SqliteConnection,
    statement: &'e CompiledStatement,
) -> RowStream<'e> {
    debug!(sql = %statement.sql(), args = statement.args().len(), "Running query");
    bind_args(statement.sql(), statement.args()).fetch(conn)
}

/// Streams at most the first row of a compiled query. The driver stops
/// stepping after that row, so later rows are never evaluated.
pub(crate) fn fetch_first<'e>(
    conn: &'e mut SqliteConnection,
    statement: &'e CompiledStatement,
) -> RowStream<'e> {
    debug!(sql = %statement.sql(), args = statement.args().len(), "Running single-row query");
    stream::once(bind_args(statement.sql(), statement.args()).fetch_optional(conn))
        .try_filter_map(future::ok)
        .boxed()
}
