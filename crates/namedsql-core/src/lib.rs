//! # namedsql-core
//!
//! Named-parameter statements for drivers that only understand positional
//! placeholders, and materialization of the rows they return.
//!
//! This crate provides:
//! - A scanner that indexes `:name:` (or `@name`) parameters in query text
//! - A compiler that rewrites them into `?` placeholders with ordered arguments
//! - A diagnostic renderer that inlines arguments back into the SQL for logs
//! - Generic rows with typed accessors, and typed decoding into records
//!
//! The crate does no I/O. Execution collaborators such as `namedsql-sqlite`
//! feed compiled statements to a driver and hand back a [`RowCursor`].
//!
//! ## Binding and compiling
//!
//! ```rust
//! use namedsql_core::{Error, SqlValue, Statement};
//!
//! let mut stmt = Statement::new("SELECT * FROM Foo WHERE id = :a: AND foo = :a:");
//! stmt.bind_named("a", 5_i64);
//!
//! let compiled = stmt.compile().unwrap();
//! assert_eq!(compiled.sql(), "SELECT * FROM Foo WHERE id = ? AND foo = ?");
//! assert_eq!(compiled.args(), &[SqlValue::Int64(5), SqlValue::Int64(5)]);
//!
//! // Bound names must match the query exactly.
//! let mut stmt = Statement::new("SELECT * FROM Foo WHERE id = :a: AND bar = :b:");
//! stmt.bind_named("a", 5_i64);
//! assert!(matches!(stmt.compile(), Err(Error::ParameterMismatch { .. })));
//! ```
//!
//! ## Reading rows
//!
//! ```rust
//! use namedsql_core::{Error, Row, SqlValue};
//!
//! let row: Row = [("id", SqlValue::Int8(3)), ("name", SqlValue::Text("ada".into()))]
//!     .into_iter()
//!     .collect();
//!
//! assert_eq!(row.int("id").unwrap(), 3);
//! assert!(matches!(row.int("name"), Err(Error::CannotConvert { .. })));
//! assert!(matches!(row.string("missing"), Err(Error::ColumnNotFound(_))));
//! ```

pub mod compiler;
pub mod config;
pub mod cursor;
mod error;
pub mod parser;
pub mod record;
pub mod render;
pub mod row;
pub mod span;
pub mod statement;
pub mod value;

pub use config::BindConfig;
pub use cursor::{ResultSet, RowCursor};
pub use error::{Error, Result};
pub use parser::{NamedParameterIndex, ParamStyle, Placeholder};
pub use record::{ColumnPlan, FieldMapping, Record};
pub use row::{Row, Rows};
pub use span::Span;
pub use statement::{CompiledStatement, Statement, StatementState};
pub use value::{FromSqlValue, SqlValue, ToSqlValue};
