//! Connection pool configuration
//!
//! Every connection parameter the pool understands, with its default. Only
//! `database` is required.

use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Store driving the pool
    pub backend: DatabaseType,
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Username
    pub user: String,
    /// Password
    pub password: String,
    /// Database name (SQLite: file path)
    #[serde(alias = "db")]
    pub database: Option<String>,
    /// Connection character set
    pub charset: String,
    /// Autocommit mode of new connections
    #[serde(alias = "autocommit")]
    pub autocommit_default: bool,
    /// Upper bound of live connections
    #[serde(alias = "maxsize")]
    pub max_pool_size: usize,
    /// Connections opened when the pool is initialized
    #[serde(alias = "minsize")]
    pub min_pool_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseType::Mysql,
            host: "localhost".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: "root".to_string(),
            database: None,
            charset: "utf8".to_string(),
            autocommit_default: true,
            max_pool_size: 10,
            min_pool_size: 1,
        }
    }
}

impl PoolConfig {
    /// Create a configuration for the given database with all other defaults
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: Some(database.into()),
            ..Default::default()
        }
    }

    /// Parse a JSON configuration object
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DatabaseError::config(e.to_string()))
    }

    /// Build a configuration from string key/value pairs.
    ///
    /// Recognized keys: `backend`, `host`, `port`, `user`, `password`,
    /// `db`/`database`, `charset`, `autocommit`, `maxsize`, `minsize`.
    /// Unknown keys are rejected.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "backend" => config.backend = value.parse()?,
                "host" => config.host = value.clone(),
                "port" => config.port = parse_number(key, value)?,
                "user" => config.user = value.clone(),
                "password" => config.password = value.clone(),
                "db" | "database" => config.database = Some(value.clone()),
                "charset" => config.charset = value.clone(),
                "autocommit" => {
                    config.autocommit_default = match value.to_lowercase().as_str() {
                        "true" | "1" => true,
                        "false" | "0" => false,
                        _ => {
                            return Err(DatabaseError::config(format!(
                                "invalid autocommit value: {value}"
                            )))
                        }
                    }
                }
                "maxsize" => config.max_pool_size = parse_number(key, value)?,
                "minsize" => config.min_pool_size = parse_number(key, value)?,
                other => {
                    return Err(DatabaseError::config(format!(
                        "unknown configuration key: {other}"
                    )))
                }
            }
        }
        Ok(config)
    }

    /// Set the store backend
    #[must_use]
    pub fn backend(mut self, backend: DatabaseType) -> Self {
        self.backend = backend;
        self
    }

    /// Set the database host
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the database port
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username
    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the character set
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Set the autocommit mode of new connections
    #[must_use]
    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit_default = autocommit;
        self
    }

    /// Set the pool size bounds
    #[must_use]
    pub fn pool_size(mut self, min: usize, max: usize) -> Self {
        self.min_pool_size = min;
        self.max_pool_size = max;
        self
    }

    /// Required database name, or a configuration error
    pub fn database(&self) -> Result<&str> {
        match self.database.as_deref() {
            Some(db) if !db.is_empty() => Ok(db),
            _ => Err(DatabaseError::config("database is required")),
        }
    }

    /// Check the configuration before any connection is opened
    pub fn validate(&self) -> Result<()> {
        self.database()?;
        if self.max_pool_size == 0 {
            return Err(DatabaseError::config("maxsize must be at least 1"));
        }
        if self.min_pool_size > self.max_pool_size {
            return Err(DatabaseError::config(format!(
                "minsize {} exceeds maxsize {}",
                self.min_pool_size, self.max_pool_size
            )));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| DatabaseError::config(format!("invalid {key} value: {value}")))
}
