//! Column value types
//!
//! This module defines the values bound to statements and read back from rows,
//! and the conversions between them and the Rust types of model fields.

use super::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column value that can hold different types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DatabaseValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit floating point
    Double(f64),
    /// String value
    String(String),
    /// Binary data
    Bytes(Vec<u8>),
}

impl DatabaseValue {
    /// Get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DatabaseValue::Bool(v) => Some(*v),
            DatabaseValue::Int(v) => Some(*v != 0),
            DatabaseValue::String(s) => match s.to_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get the value as an i64
    pub fn as_int(&self) -> Option<i64> {
        match self {
            DatabaseValue::Int(v) => Some(*v),
            DatabaseValue::Bool(v) => Some(i64::from(*v)),
            DatabaseValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Get the value as an f64
    pub fn as_double(&self) -> Option<f64> {
        match self {
            DatabaseValue::Double(v) => Some(*v),
            DatabaseValue::Int(v) => Some(*v as f64),
            DatabaseValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Get the value as a string slice (zero-copy for String values)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DatabaseValue::String(s) => Some(s.as_str()),
            DatabaseValue::Bytes(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Bool(_) => "bool",
            DatabaseValue::Int(_) => "int",
            DatabaseValue::Double(_) => "double",
            DatabaseValue::String(_) => "string",
            DatabaseValue::Bytes(_) => "bytes",
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(v: bool) -> Self {
        DatabaseValue::Bool(v)
    }
}

impl From<i32> for DatabaseValue {
    fn from(v: i32) -> Self {
        DatabaseValue::Int(i64::from(v))
    }
}

impl From<i64> for DatabaseValue {
    fn from(v: i64) -> Self {
        DatabaseValue::Int(v)
    }
}

impl From<u32> for DatabaseValue {
    fn from(v: u32) -> Self {
        DatabaseValue::Int(i64::from(v))
    }
}

impl From<f64> for DatabaseValue {
    fn from(v: f64) -> Self {
        DatabaseValue::Double(v)
    }
}

impl From<String> for DatabaseValue {
    fn from(v: String) -> Self {
        DatabaseValue::String(v)
    }
}

impl From<&str> for DatabaseValue {
    fn from(v: &str) -> Self {
        DatabaseValue::String(v.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(v: Vec<u8>) -> Self {
        DatabaseValue::Bytes(v)
    }
}

impl<T: Into<DatabaseValue>> From<Option<T>> for DatabaseValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// Conversion from a column value into a model field's Rust type
pub trait FromValue: Sized {
    /// Convert, failing with [`DatabaseError::TypeMismatch`] when the value does not fit
    fn from_value(value: DatabaseValue) -> Result<Self>;
}

impl FromValue for DatabaseValue {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        match value {
            DatabaseValue::String(s) => Ok(s),
            DatabaseValue::Bytes(b) => String::from_utf8(b)
                .map_err(|_| DatabaseError::type_mismatch("string", "non-utf8 bytes")),
            other => Err(DatabaseError::type_mismatch("string", other.type_name())),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| DatabaseError::type_mismatch("bool", value.type_name()))
    }
}

impl FromValue for i64 {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        value
            .as_int()
            .ok_or_else(|| DatabaseError::type_mismatch("int", value.type_name()))
    }
}

impl FromValue for i32 {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|_| DatabaseError::type_mismatch("i32", "out of range int"))
    }
}

impl FromValue for f64 {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        value
            .as_double()
            .ok_or_else(|| DatabaseError::type_mismatch("double", value.type_name()))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        match value {
            DatabaseValue::Bytes(b) => Ok(b),
            DatabaseValue::String(s) => Ok(s.into_bytes()),
            other => Err(DatabaseError::type_mismatch("bytes", other.type_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: DatabaseValue) -> Result<Self> {
        match value {
            DatabaseValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A row of query results (column name -> value mapping)
pub type DatabaseRow = HashMap<String, DatabaseValue>;

/// Rows returned from a query, in the order the store produced them
pub type DatabaseResult = Vec<DatabaseRow>;
