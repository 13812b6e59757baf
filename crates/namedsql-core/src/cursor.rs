//! Materialization of sequential row cursors.
//!
//! A [`ResultSet`] takes ownership of a driver cursor and turns it into
//! [`Row`]s or typed records. Every fetch consumes the cursor: it is closed
//! exactly once, whether the fetch runs to the end, stops after the first
//! row, fails midway, or is dropped before it completes. Fetching again
//! returns `ResultClosed`.
//!
//! Rows are pulled one at a time, so `fetch_one` never asks the driver for a
//! second row. Reading is async to let drivers stream from a connection;
//! nothing here depends on a particular runtime.

use std::future::Future;

use tracing::warn;

use crate::error::Error;
use crate::record::{ColumnPlan, Record};
use crate::row::{Row, Rows};
use crate::value::SqlValue;

/// A forward-only source of rows provided by a driver.
pub trait RowCursor: Send {
    /// Driver error type. Layer errors such as `ResultClosed` convert into it.
    type Error: std::error::Error + From<Error>;

    /// Column names in driver order.
    fn columns(&self) -> &[String];

    /// Scans the next row into `buffer`, one slot per column. Resolves to
    /// false once the cursor is exhausted.
    ///
    /// # Errors
    ///
    /// Any driver error raised while reading the row.
    fn next_row(
        &mut self,
        buffer: &mut [SqlValue],
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Releases the cursor. Must not block, since it also runs on drop.
    ///
    /// # Errors
    ///
    /// Any driver error raised while closing.
    fn close(&mut self) -> Result<(), Self::Error>;
}

/// Closes the wrapped cursor when dropped unless it was released explicitly.
struct CursorGuard<C: RowCursor> {
    cursor: Option<C>,
}

impl<C: RowCursor> CursorGuard<C> {
    const fn new(cursor: C) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    async fn next_row(&mut self, buffer: &mut [SqlValue]) -> Result<bool, C::Error> {
        match self.cursor.as_mut() {
            Some(cursor) => cursor.next_row(buffer).await,
            None => Err(Error::ResultClosed.into()),
        }
    }

    fn release(mut self) -> Result<(), C::Error> {
        match self.cursor.take() {
            Some(mut cursor) => cursor.close(),
            None => Ok(()),
        }
    }
}

impl<C: RowCursor> Drop for CursorGuard<C> {
    fn drop(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            if let Err(error) = cursor.close() {
                warn!(%error, "Failed to close row cursor");
            }
        }
    }
}

/// The rows produced by a query, backed by a single-use cursor.
pub struct ResultSet<C: RowCursor> {
    columns: Vec<String>,
    cursor: Option<C>,
}

impl<C: RowCursor> std::fmt::Debug for ResultSet<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSet")
            .field("columns", &self.columns)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<C: RowCursor> ResultSet<C> {
    /// Wraps a freshly opened cursor.
    pub fn new(cursor: C) -> Self {
        Self {
            columns: cursor.columns().to_vec(),
            cursor: Some(cursor),
        }
    }

    /// Returns the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true once the cursor has been consumed or closed.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.cursor.is_none()
    }

    fn take_cursor(&mut self) -> Result<CursorGuard<C>, C::Error> {
        self.cursor
            .take()
            .map(CursorGuard::new)
            .ok_or_else(|| Error::ResultClosed.into())
    }

    /// Reads every remaining row.
    ///
    /// # Errors
    ///
    /// `ResultClosed` if already consumed, otherwise the first driver error.
    pub async fn fetch_all(&mut self) -> Result<Rows, C::Error> {
        let mut guard = self.take_cursor()?;
        let mut buffer = vec![SqlValue::Null; self.columns.len()];
        let mut rows = Vec::new();

        while guard.next_row(&mut buffer).await? {
            rows.push(Row::from_scan(&self.columns, &mut buffer));
        }

        guard.release()?;
        Ok(rows)
    }

    /// Reads the first row and closes the cursor. Yields an empty row when
    /// there are none.
    ///
    /// # Errors
    ///
    /// `ResultClosed` if already consumed, otherwise the first driver error.
    pub async fn fetch_one(&mut self) -> Result<Row, C::Error> {
        let mut guard = self.take_cursor()?;
        let mut buffer = vec![SqlValue::Null; self.columns.len()];

        let row = if guard.next_row(&mut buffer).await? {
            Row::from_scan(&self.columns, &mut buffer)
        } else {
            Row::new()
        };

        guard.release()?;
        Ok(row)
    }

    /// Decodes every remaining row into `T`. Nothing is returned if any row
    /// fails to scan or decode.
    ///
    /// # Errors
    ///
    /// `ResultClosed` if already consumed, otherwise the first driver or
    /// conversion error.
    pub async fn fetch_typed<T: Record + Send>(&mut self) -> Result<Vec<T>, C::Error> {
        let mut guard = self.take_cursor()?;
        let plan = ColumnPlan::new::<T>(&self.columns);
        let mut buffer = vec![SqlValue::Null; self.columns.len()];
        let mut records = Vec::new();

        while guard.next_row(&mut buffer).await? {
            records.push(plan.decode(&self.columns, &buffer)?);
        }

        guard.release()?;
        Ok(records)
    }

    /// Closes the cursor without reading it. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Any driver error raised while closing.
    pub fn close(&mut self) -> Result<(), C::Error> {
        match self.cursor.take() {
            Some(cursor) => CursorGuard::new(cursor).release(),
            None => Ok(()),
        }
    }
}

impl<C: RowCursor> Drop for ResultSet<C> {
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            drop(CursorGuard::new(cursor));
        }
    }
}
