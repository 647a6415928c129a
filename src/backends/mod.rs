//! Database backend implementations
//!
//! This module contains the driver-side connection pools and connections
//! for the supported stores.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::{MysqlConnection, MysqlPool};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqlitePool};
