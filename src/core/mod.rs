//! Core ORM types and traits
//!
//! This module provides the building blocks of the mapping layer: field
//! descriptors and schema derivation, the connection pool and query executor,
//! and the model trait built on top of them.

pub mod config;
pub mod database;
pub mod database_types;
pub mod error;
pub mod executor;
pub mod field;
pub mod model;
pub mod pool;
pub mod schema;
pub mod transaction;
pub mod value;

// Re-export commonly used types
pub use config::PoolConfig;
pub use database::{Connection, ConnectionPool, PoolStats, PooledConnection};
pub use database_types::DatabaseType;
pub use error::{DatabaseError, Result, SchemaError};
pub use executor::Executor;
pub use field::{next_id, ColumnType, DefaultSource, Field};
pub use model::{FindOptions, Limit, Model};
pub use pool::Pool;
pub use schema::{Schema, SchemaBuilder, SchemaCell};
pub use transaction::Transaction;
pub use value::{DatabaseResult, DatabaseRow, DatabaseValue, FromValue};
