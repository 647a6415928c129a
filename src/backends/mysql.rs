//! MySQL backend
//!
//! Pooled MySQL connections using mysql_async. The pool keeps between
//! `min_pool_size` and `max_pool_size` live connections; `get_conn` suspends
//! while all of them are checked out.

use crate::core::{
    config::PoolConfig,
    database::{Connection, ConnectionPool, PoolStats, PooledConnection},
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    value::{DatabaseResult, DatabaseRow, DatabaseValue},
};
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts, OptsBuilder, Params, Pool, PoolConstraints, PoolOpts, Row, Value};
use tracing::{debug, info};

/// Pool of MySQL connections
pub struct MysqlPool {
    pool: Pool,
    max_size: usize,
}

impl MysqlPool {
    /// Build the pool from configuration and open the first connection
    ///
    /// # Errors
    ///
    /// Returns `Config` for a missing database or invalid size bounds and
    /// `Statement` if the server cannot be reached.
    pub async fn open(config: &PoolConfig) -> Result<Self> {
        let database = config.database()?;
        let constraints = PoolConstraints::new(config.min_pool_size, config.max_pool_size)
            .ok_or_else(|| {
                DatabaseError::config(format!(
                    "invalid pool bounds {}..{}",
                    config.min_pool_size, config.max_pool_size
                ))
            })?;

        let mut init = vec![format!("SET NAMES {}", config.charset)];
        if !config.autocommit_default {
            init.push("SET autocommit=0".to_string());
        }

        let opts = OptsBuilder::default()
            .ip_or_hostname(config.host.clone())
            .tcp_port(config.port)
            .user(Some(config.user.clone()))
            .pass(Some(config.password.clone()))
            .db_name(Some(database.to_string()))
            .init(init)
            .pool_opts(PoolOpts::default().with_constraints(constraints));

        let pool = Pool::new(Opts::from(opts));

        // Fail fast on unreachable servers instead of on the first query.
        drop(pool.get_conn().await?);

        info!(host = %config.host, database = %database, "MySQL connection pool created");
        Ok(Self {
            pool,
            max_size: config.max_pool_size,
        })
    }
}

#[async_trait]
impl ConnectionPool for MysqlPool {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    async fn acquire(&self) -> Result<PooledConnection> {
        let conn = self.pool.get_conn().await?;
        Ok(Box::new(MysqlConnection { conn }))
    }

    fn stats(&self) -> PoolStats {
        // mysql_async keeps its counters private
        PoolStats {
            max_size: self.max_size,
            ..PoolStats::default()
        }
    }

    async fn close(&self) -> Result<()> {
        self.pool.clone().disconnect().await?;
        Ok(())
    }
}

/// One pooled MySQL connection
pub struct MysqlConnection {
    conn: Conn,
}

fn to_params(params: &[DatabaseValue]) -> Params {
    if params.is_empty() {
        return Params::Empty;
    }
    Params::Positional(params.iter().map(value_to_param).collect())
}

/// Convert DatabaseValue to a MySQL parameter
fn value_to_param(value: &DatabaseValue) -> Value {
    match value {
        DatabaseValue::Null => Value::NULL,
        DatabaseValue::Bool(v) => Value::from(*v),
        DatabaseValue::Int(v) => Value::Int(*v),
        DatabaseValue::Double(v) => Value::Double(*v),
        DatabaseValue::String(v) => Value::Bytes(v.clone().into_bytes()),
        DatabaseValue::Bytes(v) => Value::Bytes(v.clone()),
    }
}

/// Convert a MySQL value into a DatabaseValue
fn from_mysql_value(value: Value) -> DatabaseValue {
    match value {
        Value::NULL => DatabaseValue::Null,
        Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => DatabaseValue::String(s),
            Err(e) => DatabaseValue::Bytes(e.into_bytes()),
        },
        Value::Int(i) => DatabaseValue::Int(i),
        Value::UInt(u) => i64::try_from(u)
            .map(DatabaseValue::Int)
            .unwrap_or_else(|_| DatabaseValue::String(u.to_string())),
        Value::Float(f) => DatabaseValue::Double(f64::from(f)),
        Value::Double(d) => DatabaseValue::Double(d),
        Value::Date(year, month, day, hour, minute, second, micro) => DatabaseValue::String(
            format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}.{micro:06}"),
        ),
        Value::Time(is_neg, days, hours, minutes, seconds, micro) => {
            let sign = if is_neg { "-" } else { "" };
            let hours = days * 24 + u32::from(hours);
            DatabaseValue::String(format!(
                "{sign}{hours}:{minutes:02}:{seconds:02}.{micro:06}"
            ))
        }
    }
}

fn row_to_database_row(mut row: Row) -> DatabaseRow {
    let names: Vec<String> = row
        .columns_ref()
        .iter()
        .map(|c| c.name_str().into_owned())
        .collect();

    let mut db_row = DatabaseRow::with_capacity(names.len());
    for (i, name) in names.into_iter().enumerate() {
        let value = row.take::<Value, _>(i).unwrap_or(Value::NULL);
        db_row.insert(name, from_mysql_value(value));
    }
    db_row
}

#[async_trait]
impl Connection for MysqlConnection {
    async fn query(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
        max_rows: Option<usize>,
    ) -> Result<DatabaseResult> {
        let mut result = self.conn.exec_iter(sql, to_params(params)).await?;

        let mut rows = DatabaseResult::new();
        while max_rows.map_or(true, |max| rows.len() < max) {
            match result.next().await? {
                Some(row) => rows.push(row_to_database_row(row)),
                None => break,
            }
        }
        // Unread rows must be drained before the connection is reused
        result.drop_result().await?;
        Ok(rows)
    }

    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<u64> {
        self.conn.exec_drop(sql, to_params(params)).await?;
        Ok(self.conn.affected_rows())
    }

    async fn begin(&mut self) -> Result<()> {
        debug!("begin transaction");
        self.conn.query_drop("START TRANSACTION").await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.conn.query_drop("COMMIT").await?;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.conn.query_drop("ROLLBACK").await?;
        Ok(())
    }
}
