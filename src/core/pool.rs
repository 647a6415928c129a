//! Connection pool manager
//!
//! [`Pool`] is the explicitly passed handle to the bounded connection pool.
//! It is created uninitialized, initialized once from a [`PoolConfig`],
//! and torn down by [`Pool::close`]; clones share the same state.

use super::config::PoolConfig;
use super::database::{ConnectionPool, PoolStats, PooledConnection};
use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared handle to the connection pool
#[derive(Clone, Default)]
pub struct Pool {
    inner: Arc<RwLock<Option<Arc<dyn ConnectionPool>>>>,
}

impl Pool {
    /// Create an uninitialized handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and initialize a pool in one step
    pub async fn connect(config: PoolConfig) -> Result<Self> {
        let pool = Self::new();
        pool.initialize(config).await?;
        Ok(pool)
    }

    /// Wrap an already running connection pool
    pub fn from_connection_pool(pool: Arc<dyn ConnectionPool>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(pool))),
        }
    }

    /// Open the pool described by `config`.
    ///
    /// # Errors
    ///
    /// - `Config` when the configuration is invalid or names a backend that
    ///   was not compiled in
    /// - `AlreadyInitialized` when the pool is live; call [`Pool::close`] first
    /// - `Statement` when the initial connections cannot be opened
    pub async fn initialize(&self, config: PoolConfig) -> Result<()> {
        config.validate()?;
        if self.is_initialized() {
            return Err(DatabaseError::AlreadyInitialized);
        }

        info!(
            backend = %config.backend,
            host = %config.host,
            port = config.port,
            max_size = config.max_pool_size,
            min_size = config.min_pool_size,
            "create database connection pool"
        );
        let opened = open_backend(&config).await?;

        let rejected = {
            let mut slot = self.inner.write();
            if slot.is_some() {
                Some(opened)
            } else {
                *slot = Some(opened);
                None
            }
        };
        // Lost a race against a concurrent initialize.
        if let Some(pool) = rejected {
            pool.close().await?;
            return Err(DatabaseError::AlreadyInitialized);
        }
        Ok(())
    }

    /// Check if the pool is live
    pub fn is_initialized(&self) -> bool {
        self.inner.read().is_some()
    }

    fn current(&self) -> Result<Arc<dyn ConnectionPool>> {
        self.inner
            .read()
            .as_ref()
            .map(Arc::clone)
            .ok_or(DatabaseError::NotInitialized)
    }

    /// Store behind the pool
    pub fn database_type(&self) -> Result<DatabaseType> {
        Ok(self.current()?.database_type())
    }

    /// Check out a connection, suspending while the pool is exhausted.
    ///
    /// The returned handle goes back to the pool when dropped, on every path.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        let pool = self.current()?;
        debug!("acquiring connection from pool");
        pool.acquire().await
    }

    /// Current pool statistics
    pub fn stats(&self) -> Result<PoolStats> {
        Ok(self.current()?.stats())
    }

    /// Tear the pool down. Later operations fail with `NotInitialized`
    /// until the pool is initialized again.
    pub async fn close(&self) -> Result<()> {
        let pool = self.inner.write().take();
        if let Some(pool) = pool {
            pool.close().await?;
            info!("database connection pool closed");
        }
        Ok(())
    }
}

async fn open_backend(config: &PoolConfig) -> Result<Arc<dyn ConnectionPool>> {
    match config.backend {
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => Ok(Arc::new(
            crate::backends::sqlite::SqlitePool::open(config).await?,
        )),
        #[cfg(feature = "mysql")]
        DatabaseType::Mysql => Ok(Arc::new(
            crate::backends::mysql::MysqlPool::open(config).await?,
        )),
        #[allow(unreachable_patterns)]
        other => Err(DatabaseError::config(format!(
            "backend {other} is not enabled in this build"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uninitialized_pool() {
        let pool = Pool::new();
        assert!(!pool.is_initialized());
        assert!(matches!(
            pool.acquire().await.err(),
            Some(DatabaseError::NotInitialized)
        ));
        assert!(matches!(
            pool.database_type(),
            Err(DatabaseError::NotInitialized)
        ));
        assert!(pool.close().await.is_ok());
    }

    #[tokio::test]
    async fn test_initialize_requires_database() {
        let pool = Pool::new();
        let err = pool.initialize(PoolConfig::default()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Config(_)));
        assert!(!pool.is_initialized());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_initialize_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pool.db");
        let config = PoolConfig::new(path.to_string_lossy())
            .backend(DatabaseType::Sqlite)
            .pool_size(1, 2);

        let pool = Pool::connect(config.clone()).await.unwrap();
        assert_eq!(pool.database_type().unwrap(), DatabaseType::Sqlite);

        let err = pool.initialize(config.clone()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::AlreadyInitialized));

        pool.close().await.unwrap();
        assert!(matches!(
            pool.acquire().await.err(),
            Some(DatabaseError::NotInitialized)
        ));

        pool.initialize(config).await.unwrap();
        assert!(pool.is_initialized());
    }
}
