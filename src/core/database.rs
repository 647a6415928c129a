//! Connection capability traits
//!
//! This module defines what the ORM needs from a store driver: a pool that
//! hands out connections, and connections that run bound statements and
//! control a transaction. Backends implement both.

use super::database_types::DatabaseType;
use super::error::Result;
use super::value::{DatabaseResult, DatabaseValue};
use async_trait::async_trait;

/// One live connection checked out of a pool
///
/// Statements arrive already translated to the driver's native placeholder
/// syntax; arguments are always bound by the driver, never formatted into
/// the SQL text.
#[async_trait]
pub trait Connection: Send {
    /// Run a SELECT and return up to `max_rows` rows (all rows when `None`)
    async fn query(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
        max_rows: Option<usize>,
    ) -> Result<DatabaseResult>;

    /// Run a mutating statement and return the affected-row count
    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<u64>;

    /// Begin an explicit transaction on this connection
    async fn begin(&mut self) -> Result<()>;

    /// Commit the current transaction
    async fn commit(&mut self) -> Result<()>;

    /// Roll back the current transaction
    async fn rollback(&mut self) -> Result<()>;
}

/// Scoped connection handle; dropping it returns the connection to its pool
pub type PooledConnection = Box<dyn Connection>;

/// Pool statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Total number of connections in the pool
    pub size: usize,
    /// Number of idle connections
    pub available: usize,
    /// Upper bound of the pool
    pub max_size: usize,
}

/// Bounded pool of live connections
///
/// # Example
/// ```ignore
/// let conn = pool.acquire().await?;  // suspends while the pool is exhausted
/// conn.execute("delete from `users` where `id`=?", &[id]).await?;
/// // conn dropped: back in the pool
/// ```
#[async_trait]
pub trait ConnectionPool: Send + Sync {
    /// Store behind this pool
    fn database_type(&self) -> DatabaseType;

    /// Get a connection, suspending the caller until one is free
    async fn acquire(&self) -> Result<PooledConnection>;

    /// Current pool statistics
    fn stats(&self) -> PoolStats;

    /// Close all connections and shut down the pool
    async fn close(&self) -> Result<()>;
}
