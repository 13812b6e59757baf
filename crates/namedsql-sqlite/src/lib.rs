//! # namedsql-sqlite
//!
//! Runs [`namedsql_core`] statements against SQLite through `sqlx`.
//!
//! [`Database`] wraps a connection pool. Each call compiles the statement,
//! sends the positional SQL and its arguments to the driver, and hands back
//! an [`ExecResult`] or a single-use [`QueryResult`]. Both keep the compiled
//! statement so the executed SQL can be rendered for logs.
//!
//! ```ignore
//! use namedsql_sqlite::{Database, DatabaseConfig};
//!
//! let db = Database::connect(DatabaseConfig::new("sqlite::memory:")).await?;
//!
//! let mut insert = db.statement("INSERT INTO users (name) VALUES (:name:)");
//! insert.bind_named("name", "ada");
//! let done = db.exec(&insert).await?;
//! tracing::info!(query = %done.last_executed_query(), "inserted");
//!
//! let mut select = db.statement("SELECT id, name FROM users WHERE id = :id:");
//! select.bind_named("id", done.last_insert_id());
//! let rows = db.query(&select).await?.fetch_all().await?;
//! ```

pub mod config;
pub mod database;
mod driver;
pub mod error;
pub mod prepared;
pub mod result;
pub mod transaction;

pub use config::DatabaseConfig;
pub use database::Database;
pub use error::{DbError, Result};
pub use prepared::PreparedStatement;
pub use result::{ExecResult, QueryResult, SqliteCursor};
pub use transaction::Transaction;
