//! Field descriptors
//!
//! A [`Field`] describes one mapped column: its semantic type, SQL type string,
//! primary-key flag and where its default value comes from.

use super::value::DatabaseValue;
use std::fmt;

/// Semantic column type, each carrying its SQL type string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnType {
    /// Variable length string, `varchar(100)` unless overridden
    String { ddl: String },
    /// Boolean flag
    Boolean,
    /// Integer, `bigint` unless overridden
    Integer { ddl: String },
    /// Floating point, `real` unless overridden
    Float { ddl: String },
    /// Long text
    Text,
}

impl ColumnType {
    /// SQL type string used for this column
    pub fn sql_type(&self) -> &str {
        match self {
            ColumnType::String { ddl } | ColumnType::Integer { ddl } | ColumnType::Float { ddl } => {
                ddl
            }
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
        }
    }

    /// Type-appropriate empty value used when no default source is declared
    pub fn empty_value(&self) -> DatabaseValue {
        match self {
            ColumnType::String { .. } | ColumnType::Text => DatabaseValue::String(String::new()),
            ColumnType::Boolean => DatabaseValue::Bool(false),
            ColumnType::Integer { .. } => DatabaseValue::Int(0),
            ColumnType::Float { .. } => DatabaseValue::Double(0.0),
        }
    }
}

/// Where a field's default value comes from
#[derive(Clone)]
pub enum DefaultSource {
    /// Returned verbatim on every resolution
    Literal(DatabaseValue),
    /// Invoked on every resolution; may produce a fresh value each time
    Generator(fn() -> DatabaseValue),
}

impl fmt::Debug for DefaultSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSource::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            DefaultSource::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Description of one mapped column
///
/// Built once while a model type is declared and never mutated afterwards.
///
/// ```
/// use rust_orm_system::core::field::{next_id, Field};
///
/// let id = Field::string_ddl("varchar(50)").primary_key().default_fn(next_id);
/// assert!(id.is_primary_key());
/// assert_eq!(id.sql_type(), "varchar(50)");
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    name: Option<String>,
    column_type: ColumnType,
    primary_key: bool,
    default: Option<DefaultSource>,
}

impl Field {
    fn of(column_type: ColumnType) -> Self {
        Self {
            name: None,
            column_type,
            primary_key: false,
            default: None,
        }
    }

    /// String column, `varchar(100)`
    pub fn string() -> Self {
        Self::string_ddl("varchar(100)")
    }

    /// String column with an explicit SQL type
    pub fn string_ddl(ddl: impl Into<String>) -> Self {
        Self::of(ColumnType::String { ddl: ddl.into() })
    }

    /// Boolean column, defaulting to `false`
    pub fn boolean() -> Self {
        Self::of(ColumnType::Boolean).default_value(false)
    }

    /// Integer column, `bigint`, defaulting to `0`
    pub fn integer() -> Self {
        Self::integer_ddl("bigint")
    }

    /// Integer column with an explicit SQL type
    pub fn integer_ddl(ddl: impl Into<String>) -> Self {
        Self::of(ColumnType::Integer { ddl: ddl.into() }).default_value(0i64)
    }

    /// Floating point column, `real`, defaulting to `0.0`
    pub fn float() -> Self {
        Self::float_ddl("real")
    }

    /// Floating point column with an explicit SQL type
    pub fn float_ddl(ddl: impl Into<String>) -> Self {
        Self::of(ColumnType::Float { ddl: ddl.into() }).default_value(0.0)
    }

    /// Long text column
    pub fn text() -> Self {
        Self::of(ColumnType::Text)
    }

    /// Mark this field as the primary key
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Use a literal default
    #[must_use]
    pub fn default_value(mut self, value: impl Into<DatabaseValue>) -> Self {
        self.default = Some(DefaultSource::Literal(value.into()));
        self
    }

    /// Use a zero-argument generator as default
    #[must_use]
    pub fn default_fn(mut self, generator: fn() -> DatabaseValue) -> Self {
        self.default = Some(DefaultSource::Generator(generator));
        self
    }

    /// Set the column name explicitly
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Column name, once resolved
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn column_type(&self) -> &ColumnType {
        &self.column_type
    }

    pub fn sql_type(&self) -> &str {
        self.column_type.sql_type()
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default_source(&self) -> Option<&DefaultSource> {
        self.default.as_ref()
    }

    /// Resolve the default value of this field.
    ///
    /// Generators run once per call; callers that need a stable value must
    /// store the result (see `Model::get_value_or_default`).
    pub fn resolve_default(&self) -> DatabaseValue {
        match &self.default {
            Some(DefaultSource::Generator(generate)) => generate(),
            Some(DefaultSource::Literal(value)) => value.clone(),
            None => self.column_type.empty_value(),
        }
    }

    /// Fill in the declaration-site name unless one was set explicitly
    pub(crate) fn resolve_name(&mut self, declared: &str) {
        if self.name.is_none() {
            self.name = Some(declared.to_string());
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}, {}:{}>",
            self.sql_type(),
            self.name.as_deref().unwrap_or("?"),
            if self.primary_key { "pk" } else { "col" }
        )
    }
}

/// Generate a sortable unique identifier.
///
/// 15-digit zero-padded epoch milliseconds, 32 hex digits of a v4 UUID and a
/// `000` suffix: 50 characters, fits a `varchar(50)` primary key.
pub fn next_id() -> DatabaseValue {
    let millis = chrono::Utc::now().timestamp_millis();
    DatabaseValue::String(format!(
        "{:015}{}000",
        millis,
        uuid::Uuid::new_v4().simple()
    ))
}
