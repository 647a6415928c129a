//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_orm_system::core::database::{Connection, ConnectionPool, PoolStats, PooledConnection};
use rust_orm_system::core::field::{next_id, Field};
use rust_orm_system::prelude::*;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

define_model! {
    pub struct User as "users" {
        id: String => Field::string_ddl("varchar(50)").primary_key().default_fn(next_id),
        email: String => Field::string_ddl("varchar(50)"),
        admin: bool => Field::boolean(),
        name: String => Field::string_ddl("varchar(50)"),
        created_at: f64 => Field::float(),
    }
}

pub const CREATE_USERS: &str = "create table `users` (\
    `id` varchar(50) not null primary key, \
    `email` varchar(50) not null, \
    `admin` boolean not null, \
    `name` varchar(50) not null, \
    `created_at` real not null)";

/// Everything the mock pool saw
#[derive(Default)]
pub struct Recorder {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub begins: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
    pub statements: Mutex<Vec<(String, Vec<DatabaseValue>)>>,
    pub rows: Mutex<DatabaseResult>,
    pub affected: AtomicU64,
    pub fail_execute: AtomicBool,
    pub fail_commit: AtomicBool,
    pub fail_rollback: AtomicBool,
}

impl Recorder {
    pub fn new(affected: u64) -> Arc<Self> {
        let recorder = Self::default();
        recorder.affected.store(affected, Ordering::SeqCst);
        Arc::new(recorder)
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub fn last_statement(&self) -> Option<(String, Vec<DatabaseValue>)> {
        self.statements.lock().last().cloned()
    }
}

/// Connection pool that records calls instead of talking to a store
pub struct MockPool {
    pub recorder: Arc<Recorder>,
}

pub fn mock_executor(recorder: &Arc<Recorder>) -> Executor {
    let pool = MockPool {
        recorder: Arc::clone(recorder),
    };
    Executor::new(Pool::from_connection_pool(Arc::new(pool)))
}

#[async_trait]
impl ConnectionPool for MockPool {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    async fn acquire(&self) -> Result<PooledConnection> {
        self.recorder.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            recorder: Arc::clone(&self.recorder),
        }))
    }

    fn stats(&self) -> PoolStats {
        PoolStats::default()
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

struct MockConnection {
    recorder: Arc<Recorder>,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.recorder.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn query(
        &mut self,
        sql: &str,
        params: &[DatabaseValue],
        max_rows: Option<usize>,
    ) -> Result<DatabaseResult> {
        self.recorder
            .statements
            .lock()
            .push((sql.to_string(), params.to_vec()));
        let mut rows = self.recorder.rows.lock().clone();
        if let Some(max) = max_rows {
            rows.truncate(max);
        }
        Ok(rows)
    }

    async fn execute(&mut self, sql: &str, params: &[DatabaseValue]) -> Result<u64> {
        self.recorder
            .statements
            .lock()
            .push((sql.to_string(), params.to_vec()));
        if self.recorder.fail_execute.load(Ordering::SeqCst) {
            return Err(DatabaseError::statement("Duplicate entry for key 'PRIMARY'"));
        }
        Ok(self.recorder.affected.load(Ordering::SeqCst))
    }

    async fn begin(&mut self) -> Result<()> {
        self.recorder.begins.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn commit(&mut self) -> Result<()> {
        self.recorder.commits.fetch_add(1, Ordering::SeqCst);
        if self.recorder.fail_commit.load(Ordering::SeqCst) {
            return Err(DatabaseError::statement("Lost connection during commit"));
        }
        Ok(())
    }

    async fn rollback(&mut self) -> Result<()> {
        self.recorder.rollbacks.fetch_add(1, Ordering::SeqCst);
        if self.recorder.fail_rollback.load(Ordering::SeqCst) {
            return Err(DatabaseError::statement("Lost connection during rollback"));
        }
        Ok(())
    }
}

/// SQLite pool in a fresh temporary directory with the `users` table created
#[cfg(feature = "sqlite")]
pub async fn sqlite_executor(dir: &tempfile::TempDir, max_size: usize) -> Executor {
    let path = dir.path().join("orm.db");
    let config = PoolConfig::new(path.to_string_lossy())
        .backend(DatabaseType::Sqlite)
        .pool_size(1, max_size);
    let executor = Executor::new(Pool::connect(config).await.expect("Failed to open pool"));
    executor
        .execute(CREATE_USERS, &[], true)
        .await
        .expect("Failed to create table");
    executor
}
