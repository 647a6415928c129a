//! SQLite backend
//!
//! Pooled SQLite connections using deadpool-sqlite. Blocking rusqlite calls
//! run on deadpool's `interact` worker so they never stall the async runtime.

use crate::core::{
    config::PoolConfig,
    database::{Connection, ConnectionPool, PoolStats, PooledConnection},
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    value::{DatabaseResult, DatabaseRow, DatabaseValue},
};
use async_trait::async_trait;
use deadpool_sqlite::{Config, Object, Pool, Runtime};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{params_from_iter, Row};
use tracing::{debug, warn};

/// Pool of SQLite connections to one database file
pub struct SqlitePool {
    pool: Pool,
}

impl SqlitePool {
    /// Open the pool and warm it up to `min_pool_size` connections
    ///
    /// # Errors
    ///
    /// Returns `Config` if the database path is missing and `Statement` if
    /// the pool or its initial connections cannot be created.
    pub async fn open(config: &PoolConfig) -> Result<Self> {
        let path = config.database()?;
        for (setting, reason) in ignored_settings(config) {
            warn!(setting, "{reason}");
        }

        let mut pool_config = Config::new(path);
        pool_config.pool = Some(deadpool_sqlite::PoolConfig::new(config.max_pool_size));
        let pool = pool_config
            .create_pool(Runtime::Tokio1)
            .map_err(|e| DatabaseError::statement(format!("Failed to create pool: {e}")))?;

        let mut warm = Vec::with_capacity(config.min_pool_size);
        for _ in 0..config.min_pool_size {
            warm.push(get(&pool).await?);
        }
        drop(warm);

        debug!(path = %path, "SQLite pool ready");
        Ok(Self { pool })
    }
}

/// Settings in `config` that SQLite cannot honour, with the reason
fn ignored_settings(config: &PoolConfig) -> Vec<(&'static str, &'static str)> {
    let mut ignored = Vec::new();
    if !config.charset.eq_ignore_ascii_case("utf8")
        && !config.charset.eq_ignore_ascii_case("utf8mb4")
    {
        ignored.push(("charset", "SQLite always stores UTF-8, charset ignored"));
    }
    if !config.autocommit_default {
        ignored.push((
            "autocommit",
            "SQLite connections always autocommit outside an explicit transaction, autocommit=false ignored",
        ));
    }
    ignored
}

async fn get(pool: &Pool) -> Result<Object> {
    let conn = pool
        .get()
        .await
        .map_err(|e| DatabaseError::statement(format!("Failed to acquire connection: {e}")))?;

    // Connection-scoped pragma
    conn.interact(|conn| conn.execute_batch("PRAGMA foreign_keys = ON"))
        .await
        .map_err(|e| DatabaseError::statement(format!("Interact error: {e}")))??;
    Ok(conn)
}

#[async_trait]
impl ConnectionPool for SqlitePool {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    async fn acquire(&self) -> Result<PooledConnection> {
        let conn = get(&self.pool).await?;
        Ok(Box::new(SqliteConnection { conn }))
    }

    fn stats(&self) -> PoolStats {
        let status = self.pool.status();
        PoolStats {
            size: status.size,
            available: status.available,
            max_size: status.max_size,
        }
    }

    async fn close(&self) -> Result<()> {
        self.pool.close();
        Ok(())
    }
}

/// One pooled SQLite connection
pub struct SqliteConnection {
    conn: Object,
}

impl SqliteConnection {
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut rusqlite::Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        self.conn
            .interact(f)
            .await
            .map_err(|e| DatabaseError::statement(format!("Interact error: {e}")))?
            .map_err(DatabaseError::from)
    }
}

/// Convert a rusqlite Row to a DatabaseRow
fn row_to_database_row(row: &Row) -> rusqlite::Result<DatabaseRow> {
    let column_count = row.as_ref().column_count();
    let mut db_row = DatabaseRow::with_capacity(column_count);

    for i in 0..column_count {
        let column_name = row.as_ref().column_name(i)?.to_string();
        let value = match row.get_ref(i)? {
            ValueRef::Null => DatabaseValue::Null,
            ValueRef::Integer(v) => DatabaseValue::Int(v),
            ValueRef::Real(v) => DatabaseValue::Double(v),
            ValueRef::Text(v) => DatabaseValue::String(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => DatabaseValue::Bytes(v.to_vec()),
        };
        db_row.insert(column_name, value);
    }

    Ok(db_row)
}

/// Convert DatabaseValue to an owned rusqlite parameter
fn value_to_param(value: &DatabaseValue) -> Value {
    match value {
        DatabaseValue::Null => Value::Null,
        DatabaseValue::Bool(v) => Value::Integer(i64::from(*v)),
        DatabaseValue::Int(v) => Value::Integer(*v),
        DatabaseValue::Double(v) => Value::Real(*v),
        DatabaseValue::String(v) => Value::Text(v.clone()),
        DatabaseValue::Bytes(v) => Value::Blob(v.clone()),
    }
}

#[async_trait]
impl Connection for SqliteConnection {
    async fn query(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
        max_rows: Option<usize>,
    ) -> Result<DatabaseResult> {
        let sql = sql.to_string();
        let params: Vec<Value> = params.iter().map(value_to_param).collect();
        let max_rows = max_rows.unwrap_or(usize::MAX);

        self.run(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params_from_iter(params.iter()))?;

            let mut results = Vec::new();
            while results.len() < max_rows {
                match rows.next()? {
                    Some(row) => results.push(row_to_database_row(row)?),
                    None => break,
                }
            }
            Ok(results)
        })
        .await
    }

    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<u64> {
        let sql = sql.to_string();
        let params: Vec<Value> = params.iter().map(value_to_param).collect();

        let affected = self
            .run(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                stmt.execute(params_from_iter(params.iter()))
            })
            .await?;
        Ok(affected as u64)
    }

    async fn begin(&mut self) -> Result<()> {
        self.run(|conn| conn.execute_batch("BEGIN TRANSACTION")).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.run(|conn| conn.execute_batch("COMMIT")).await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.run(|conn| conn.execute_batch("ROLLBACK")).await
    }
}
