//! Connection and execution settings.

use std::time::Duration;

use namedsql_core::{BindConfig, ParamStyle};
use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Environment variable holding the database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable holding the pool size.
pub const MAX_CONNECTIONS_ENV: &str = "NAMEDSQL_MAX_CONNECTIONS";

const DEFAULT_URL: &str = "sqlite::memory:";

/// Settings for a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL.
    pub url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Grammar used to recognize named parameters.
    pub param_style: ParamStyle,
    /// Upper bound on a single statement, if any.
    pub statement_timeout: Option<Duration>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::from(DEFAULT_URL),
            max_connections: 1,
            param_style: ParamStyle::default(),
            statement_timeout: None,
        }
    }
}

impl DatabaseConfig {
    /// Creates a configuration for `url` with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Reads `DATABASE_URL` and `NAMEDSQL_MAX_CONNECTIONS`, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// `Config` if the pool size is not a positive integer.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(DATABASE_URL_ENV) {
            config.url = url;
        }
        if let Some(raw) = lookup(MAX_CONNECTIONS_ENV) {
            config.max_connections = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(DbError::Config(format!(
                        "{MAX_CONNECTIONS_ENV} must be a positive integer, got '{raw}'"
                    )));
                }
            };
        }
        Ok(config)
    }

    /// Sets the pool size.
    #[must_use]
    pub const fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the parameter grammar.
    #[must_use]
    pub const fn param_style(mut self, style: ParamStyle) -> Self {
        self.param_style = style;
        self
    }

    /// Sets the per-statement time limit.
    #[must_use]
    pub const fn statement_timeout(mut self, limit: Duration) -> Self {
        self.statement_timeout = Some(limit);
        self
    }

    /// Returns the statement binding settings.
    #[must_use]
    pub const fn bind_config(&self) -> BindConfig {
        BindConfig {
            param_style: self.param_style,
        }
    }
}
