//! Error types for SQLite execution.

use std::time::Duration;

/// Errors raised while executing statements against SQLite.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Error reported by the driver, passed through unchanged.
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    /// Binding, compilation or materialization error.
    #[error(transparent)]
    Core(#[from] namedsql_core::Error),

    /// The statement did not finish within the configured limit.
    #[error("Statement timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type for SQLite operations.
pub type Result<T> = std::result::Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_keep_their_message() {
        let err = DbError::from(namedsql_core::Error::ResultClosed);
        assert_eq!(err.to_string(), namedsql_core::Error::ResultClosed.to_string());
        assert!(matches!(err, DbError::Core(namedsql_core::Error::ResultClosed)));
    }

    #[test]
    fn test_driver_errors_pass_through() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
    }

    #[test]
    fn test_timeout_message() {
        let err = DbError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Statement timed out after 250ms");
    }
}
