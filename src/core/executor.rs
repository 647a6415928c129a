//! Query executor
//!
//! Runs statements written with the portable `?` placeholder against the
//! pool: checks the argument count, translates the placeholders to the
//! store's native syntax and binds the arguments through the driver.

use super::database_types::{count_placeholders, DatabaseType};
use super::error::{DatabaseError, Result};
use super::pool::Pool;
use super::transaction::Transaction;
use super::value::{DatabaseResult, DatabaseValue};
use tracing::{error, info};

/// Fail unless `args` has one value per placeholder of `sql`
fn check_arguments(sql: &str, args: &[DatabaseValue]) -> Result<()> {
    let expected = count_placeholders(sql);
    if expected != args.len() {
        return Err(DatabaseError::argument_mismatch(expected, args.len()));
    }
    Ok(())
}

/// Check the argument count and translate a statement for `database_type`
pub(crate) fn prepare(
    database_type: DatabaseType,
    sql: &str,
    args: &[DatabaseValue],
) -> Result<String> {
    check_arguments(sql, args)?;
    Ok(database_type.translate(sql))
}

/// Statement runner over a shared [`Pool`]
#[derive(Clone)]
pub struct Executor {
    pool: Pool,
}

impl Executor {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Run a SELECT and return up to `limit` rows (all rows when `None`).
    ///
    /// The argument count is checked before a connection is acquired; the
    /// connection is released on every path.
    pub async fn select(
        &self,
        sql: &str,
        args: &[DatabaseValue],
        limit: Option<usize>,
    ) -> Result<DatabaseResult> {
        info!(sql = %sql, "SQL");
        check_arguments(sql, args)?;
        let native = self.pool.database_type()?.translate(sql);

        let mut connection = self.pool.acquire().await?;
        let rows = connection.query(&native, args, limit).await?;

        info!(rows = rows.len(), "rows returned");
        Ok(rows)
    }

    /// Run a mutating statement and return the affected-row count.
    ///
    /// With `autocommit` false the statement runs in its own explicit
    /// transaction: committed on success, rolled back once on failure, and
    /// the original error is returned unchanged.
    pub async fn execute(&self, sql: &str, args: &[DatabaseValue], autocommit: bool) -> Result<u64> {
        info!(sql = %sql, "SQL");
        check_arguments(sql, args)?;
        let native = self.pool.database_type()?.translate(sql);

        if autocommit {
            let mut connection = self.pool.acquire().await?;
            return connection.execute(&native, args).await;
        }

        let mut tx = self.begin().await?;
        match tx.execute(sql, args).await {
            Ok(affected) => {
                tx.commit().await?;
                Ok(affected)
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    error!(error = %e, rollback_error = %rollback_error, "rollback failed");
                }
                Err(e)
            }
        }
    }

    /// Begin an explicit transaction on a dedicated connection
    pub async fn begin(&self) -> Result<Transaction> {
        let database_type = self.pool.database_type()?;
        let connection = self.pool.acquire().await?;
        Transaction::begin(connection, database_type).await
    }
}
