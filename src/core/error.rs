//! Error types for the ORM layer
//!
//! This module defines all error types that can occur while declaring models,
//! configuring the pool, and running statements.

/// Result type alias for ORM operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Malformed model declaration
///
/// Schema errors are cached by the model type that produced them, so they
/// are `Clone` and carry owned strings only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// No field was marked as primary key
    #[error("missing primary key in model {model}")]
    MissingPrimaryKey { model: String },

    /// More than one field was marked as primary key
    #[error("duplicate primary key in model {model}: {first} and {second}")]
    DuplicatePrimaryKey {
        model: String,
        first: String,
        second: String,
    },

    /// Two fields share the same name
    #[error("duplicate field {field} in model {model}")]
    DuplicateField { model: String, field: String },

    /// A field or table name resolved to an empty string
    #[error("empty name in model {model}")]
    EmptyName { model: String },
}

/// Error types for ORM operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Model declaration rejected while deriving its schema
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Missing or invalid connection parameter
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation attempted before the pool was initialized (or after it was closed)
    #[error("Connection pool is not initialized")]
    NotInitialized,

    /// `initialize` called on a live pool
    #[error("Connection pool is already initialized")]
    AlreadyInitialized,

    /// Placeholder count differs from the number of bound arguments
    #[error("Argument mismatch: statement has {expected} placeholders, got {actual} arguments")]
    ArgumentMismatch { expected: usize, actual: usize },

    /// The store rejected the statement (constraint, syntax, connectivity)
    #[error("Statement error: {0}")]
    Statement(String),

    /// Access to a field the model does not declare
    #[error("Model {model} has no attribute '{field}'")]
    AttributeAccess { model: String, field: String },

    /// A stored value cannot be converted into the field's Rust type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Operation on a transaction that was already finished
    #[error("Transaction error: {0}")]
    Transaction(String),
}

impl DatabaseError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Config(msg.into())
    }

    /// Create a statement error
    pub fn statement<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Statement(msg.into())
    }

    /// Create an argument mismatch error
    pub fn argument_mismatch(expected: usize, actual: usize) -> Self {
        DatabaseError::ArgumentMismatch { expected, actual }
    }

    /// Create an attribute access error
    pub fn attribute(model: impl Into<String>, field: impl Into<String>) -> Self {
        DatabaseError::AttributeAccess {
            model: model.into(),
            field: field.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        DatabaseError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Transaction(msg.into())
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for DatabaseError {
    fn from(e: rusqlite::Error) -> Self {
        DatabaseError::Statement(e.to_string())
    }
}

#[cfg(feature = "mysql")]
impl From<mysql_async::Error> for DatabaseError {
    fn from(e: mysql_async::Error) -> Self {
        DatabaseError::Statement(e.to_string())
    }
}
