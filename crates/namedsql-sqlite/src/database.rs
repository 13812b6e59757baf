//! Pooled SQLite access.
//!
//! Statements are compiled before a connection is acquired, so a binding
//! mismatch never reaches the driver.

use namedsql_core::{Row, Statement};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::driver;
use crate::error::Result;
use crate::prepared::PreparedStatement;
use crate::result::{ExecResult, QueryResult};
use crate::transaction::Transaction;

/// A SQLite connection pool that runs named-parameter statements.
///
/// # Example
///
/// ```ignore
/// use namedsql_sqlite::{Database, DatabaseConfig};
///
/// let db = Database::connect(DatabaseConfig::from_env()?).await?;
///
/// let mut stmt = db.statement("SELECT id, name FROM users WHERE id = :id:");
/// stmt.bind_named("id", 7);
///
/// let row = db.query_row(&stmt).await?;
/// println!("{}", row.string("name")?);
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    config: DatabaseConfig,
}

impl Database {
    /// Opens a pool described by `config`.
    ///
    /// # Errors
    ///
    /// Any driver error raised while connecting.
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        info!(
            url = %config.url,
            max_connections = config.max_connections,
            "Connected to database"
        );

        Ok(Self { pool, config })
    }

    /// Wraps an existing pool with default settings.
    #[must_use]
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            config: DatabaseConfig::default(),
        }
    }

    /// Replaces the settings. The pool itself is left untouched, so only the
    /// parameter grammar and the statement timeout take effect.
    #[must_use]
    pub fn with_config(mut self, config: DatabaseConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the settings.
    #[must_use]
    pub const fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Creates a statement using the configured parameter grammar.
    #[must_use]
    pub fn statement(&self, query: impl Into<String>) -> Statement {
        Statement::with_config(query, &self.config.bind_config())
    }

    /// Compiles and executes a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// `Core` if the bindings do not match the query, `Timeout` if the
    /// configured limit is exceeded, otherwise the driver error.
    pub async fn exec(&self, statement: &Statement) -> Result<ExecResult> {
        let compiled = statement.compile()?;
        driver::with_timeout(self.config.statement_timeout, async {
            let mut conn = self.pool.acquire().await?;
            driver::execute(&mut conn, compiled).await
        })
        .await
    }

    /// Compiles a query and has the driver validate it. Rows are read when
    /// the result is fetched, on the connection the result holds until then.
    ///
    /// # Errors
    ///
    /// `Core` if the bindings do not match the query, `Timeout` if the
    /// configured limit is exceeded, otherwise the driver error.
    pub async fn query(&self, statement: &Statement) -> Result<QueryResult<'static>> {
        let compiled = statement.compile()?;
        let timeout = self.config.statement_timeout;
        driver::with_timeout(timeout, async {
            let mut conn = self.pool.acquire().await?;
            let columns = driver::describe_columns(&mut conn, compiled.sql()).await?;
            Ok(QueryResult::pooled(compiled, columns, conn, timeout))
        })
        .await
    }

    /// Runs a query and returns its first row, or an empty row. Only the
    /// first row is evaluated.
    ///
    /// # Errors
    ///
    /// See [`Database::query`].
    pub async fn query_row(&self, statement: &Statement) -> Result<Row> {
        self.query(statement).await?.fetch_one().await
    }

    /// Parses `query` once and has the driver validate it, returning a
    /// statement that can be bound and run repeatedly.
    ///
    /// # Errors
    ///
    /// The driver error if SQLite rejects the query.
    pub async fn prepare(&self, query: impl Into<String>) -> Result<PreparedStatement> {
        let statement = self.statement(query);
        let sql = statement.positional_sql();

        let columns = driver::with_timeout(self.config.statement_timeout, async {
            let mut conn = self.pool.acquire().await?;
            driver::describe_columns(&mut conn, &sql).await
        })
        .await?;

        debug!(sql = %sql, params = statement.index().total(), "Prepared statement");

        Ok(PreparedStatement::new(
            statement,
            columns,
            self.pool.clone(),
            self.config.statement_timeout,
        ))
    }

    /// Starts a transaction on a pooled connection.
    ///
    /// # Errors
    ///
    /// Any driver error raised while beginning the transaction.
    pub async fn begin(&self) -> Result<Transaction> {
        let inner = self.pool.begin().await?;
        debug!("Transaction started");
        Ok(Transaction::new(inner, self.config.clone()))
    }

    /// Closes the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
