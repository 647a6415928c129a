//! Explicit transactions
//!
//! A [`Transaction`] owns one pooled connection from `begin` until `commit`
//! or `rollback`, so every statement it runs sees the same session.

use super::database::PooledConnection;
use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use super::executor::prepare;
use super::value::{DatabaseResult, DatabaseValue};
use tracing::{error, info, warn};

/// Transaction on a dedicated pooled connection
///
/// Dropping an unfinished transaction schedules a rollback on the current
/// tokio runtime before the connection goes back to the pool.
///
/// # Example
///
/// ```ignore
/// let mut tx = executor.begin().await?;
/// tx.execute("update `users` set `admin`=? where `id`=?", &[true.into(), id]).await?;
/// tx.commit().await?;
/// ```
pub struct Transaction {
    connection: Option<PooledConnection>,
    database_type: DatabaseType,
}

impl Transaction {
    /// Begin a transaction on an acquired connection
    pub(crate) async fn begin(
        mut connection: PooledConnection,
        database_type: DatabaseType,
    ) -> Result<Self> {
        connection.begin().await?;
        Ok(Self {
            connection: Some(connection),
            database_type,
        })
    }

    fn connection(&mut self) -> Result<&mut PooledConnection> {
        self.connection
            .as_mut()
            .ok_or_else(|| DatabaseError::transaction("Transaction already finalized"))
    }

    /// Run a SELECT inside the transaction
    pub async fn select(
        &mut self,
        sql: &str,
        args: &[DatabaseValue],
        limit: Option<usize>,
    ) -> Result<DatabaseResult> {
        info!(sql = %sql, "SQL");
        let native = prepare(self.database_type, sql, args)?;
        let rows = self.connection()?.query(&native, args, limit).await?;
        info!(rows = rows.len(), "rows returned");
        Ok(rows)
    }

    /// Run a mutating statement inside the transaction
    pub async fn execute(&mut self, sql: &str, args: &[DatabaseValue]) -> Result<u64> {
        info!(sql = %sql, "SQL");
        let native = prepare(self.database_type, sql, args)?;
        self.connection()?.execute(&native, args).await
    }

    /// Commit the transaction and release its connection.
    ///
    /// A failed commit is followed by one rollback attempt; the commit error
    /// is what the caller sees.
    pub async fn commit(mut self) -> Result<()> {
        let mut connection = self
            .connection
            .take()
            .ok_or_else(|| DatabaseError::transaction("Transaction already finalized"))?;

        if let Err(e) = connection.commit().await {
            if let Err(rollback_error) = connection.rollback().await {
                error!(error = %e, rollback_error = %rollback_error, "rollback after failed commit also failed");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Roll the transaction back and release its connection
    pub async fn rollback(mut self) -> Result<()> {
        let mut connection = self
            .connection
            .take()
            .ok_or_else(|| DatabaseError::transaction("Transaction already finalized"))?;
        connection.rollback().await
    }

    /// Check if the transaction still holds its connection
    pub fn is_active(&self) -> bool {
        self.connection.is_some()
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!("transaction dropped without commit or rollback, rolling back");
                handle.spawn(async move {
                    if let Err(e) = connection.rollback().await {
                        error!(error = %e, "automatic rollback failed");
                    }
                });
            }
            Err(_) => {
                // The session is discarded with the connection.
                warn!("transaction dropped outside a tokio runtime without commit or rollback");
            }
        }
    }
}
