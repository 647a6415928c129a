//! # Rust ORM System
//!
//! A lightweight object-relational mapping layer. Application code declares
//! models as typed structs; each model type derives its table mapping and
//! four parameterized SQL templates (select, insert, update, delete) exactly
//! once, and every instance operation reuses them through a shared async
//! connection pool.
//!
//! ## Features
//!
//! - **Schema derivation once per type**: explicit field registration, primary
//!   key validation, prebuilt SQL templates
//! - **Bound parameters only**: the portable `?` placeholder is translated to
//!   the driver's native syntax; values never enter the SQL text
//! - **Explicit pool handle**: the pool is passed to the code that needs it,
//!   not kept in a global
//! - **Async**: Tokio-based, connections are checked out for one statement or
//!   one explicit transaction
//!
//! ## Supported Databases
//!
//! | Database | Feature | Driver |
//! |----------|---------|--------|
//! | SQLite | `sqlite` (default) | rusqlite + deadpool-sqlite |
//! | MySQL | `mysql` | mysql_async |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_orm_system::prelude::*;
//!
//! define_model! {
//!     pub struct User as "users" {
//!         id: String => Field::string_ddl("varchar(50)").primary_key().default_fn(next_id),
//!         email: String => Field::string_ddl("varchar(50)"),
//!         admin: bool => Field::boolean(),
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = PoolConfig::new("app.db").backend(DatabaseType::Sqlite);
//!     let executor = Executor::new(Pool::connect(config).await?);
//!     User::register()?;
//!
//!     let mut user = User {
//!         email: Some("a@b.com".to_string()),
//!         ..Default::default()
//!     };
//!     user.save(&executor).await?;
//!
//!     let admins = User::find_all(
//!         &executor,
//!         FindOptions::new().filter("`admin`=?", vec![true.into()]).limit(10),
//!     )
//!     .await?;
//!     println!("{} admins", admins.len());
//!
//!     executor.pool().close().await
//! }
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! rust_orm_system/
//! ├── src/
//! │   ├── core/              # Core types and traits
//! │   │   ├── field.rs       # Field descriptors
//! │   │   ├── schema.rs      # Schema derivation and SQL templates
//! │   │   ├── pool.rs        # Connection pool manager
//! │   │   ├── executor.rs    # Query executor
//! │   │   ├── model.rs       # Model trait and define_model!
//! │   │   └── ...
//! │   ├── backends/          # Store drivers
//! │   └── lib.rs
//! ├── tests/                 # Integration tests
//! └── Cargo.toml
//! ```

/// Core ORM types and traits
pub mod core;

/// Database backend implementations
pub mod backends;

/// Prelude for convenient imports
///
/// ```rust
/// use rust_orm_system::prelude::*;
///
/// let config = PoolConfig::new("app.db");
/// assert_eq!(config.backend, DatabaseType::Mysql);
/// ```
pub mod prelude {
    pub use crate::core::{
        next_id, DatabaseError, DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue,
        Executor, Field, FindOptions, Limit, Model, Pool, PoolConfig, Result, Schema,
        SchemaError, Transaction,
    };
    pub use crate::define_model;
}

// Re-export at root level for convenience
pub use self::core::{
    DatabaseError, DatabaseResult, DatabaseRow, DatabaseType, DatabaseValue, Executor, Field,
    FindOptions, Model, Pool, PoolConfig, Result, Schema, SchemaError,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use prelude::*;

        let db_type = DatabaseType::Sqlite;
        assert_eq!(db_type.to_str(), "sqlite");

        let field = Field::boolean();
        assert_eq!(field.resolve_default(), DatabaseValue::Bool(false));
    }

    #[test]
    fn test_value_conversions() {
        use prelude::*;

        let val: DatabaseValue = 42.into();
        assert_eq!(val.as_int(), Some(42));

        let val: DatabaseValue = "test".into();
        assert_eq!(val.as_str(), Some("test"));
    }
}
