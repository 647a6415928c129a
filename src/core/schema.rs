//! Schema derivation
//!
//! Turns the ordered field declarations of a model type into immutable
//! [`Schema`] metadata: table name, primary key, non-key columns and the four
//! SQL templates every instance operation reuses.

use super::error::{Result, SchemaError};
use super::field::Field;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Derived, immutable mapping metadata of one model type
#[derive(Debug, Clone)]
pub struct Schema {
    model: String,
    table: String,
    primary_key: String,
    fields: Vec<String>,
    mappings: HashMap<String, Field>,
    select_sql: String,
    insert_sql: String,
    update_sql: String,
    delete_sql: String,
}

impl Schema {
    /// Start declaring a model type
    pub fn builder(model: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            model: model.into(),
            table: None,
            fields: Vec::new(),
        }
    }

    /// Name of the model type
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Attribute name of the primary key
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Attribute names of the non-key fields, in declaration order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Descriptor of a declared attribute
    pub fn field(&self, attr: &str) -> Option<&Field> {
        self.mappings.get(attr)
    }

    /// Column name of a declared attribute
    pub fn column(&self, attr: &str) -> Option<&str> {
        self.mappings.get(attr).and_then(Field::name)
    }

    /// Attribute names in insert-template order: non-key fields, then the primary key
    pub fn insert_order(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.primary_key.as_str()))
    }

    /// Attribute names in select-template order: primary key, then non-key fields
    pub fn select_order(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary_key.as_str()).chain(self.fields.iter().map(String::as_str))
    }

    pub fn select_sql(&self) -> &str {
        &self.select_sql
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert_sql
    }

    pub fn update_sql(&self) -> &str {
        &self.update_sql
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete_sql
    }
}

/// Explicit registration of a model type's fields
///
/// # Example
///
/// ```
/// use rust_orm_system::core::field::{next_id, Field};
/// use rust_orm_system::core::schema::Schema;
///
/// let schema = Schema::builder("User")
///     .table("users")
///     .field("id", Field::string_ddl("varchar(50)").primary_key().default_fn(next_id))
///     .field("email", Field::string_ddl("varchar(50)"))
///     .field("admin", Field::boolean())
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     schema.insert_sql(),
///     "insert into `users` (`email`,`admin`,`id`) value (?,?,?)"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    model: String,
    table: Option<String>,
    fields: Vec<(String, Field)>,
}

impl SchemaBuilder {
    /// Map to an explicit table instead of the model name
    #[must_use]
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Declare a field; declaration order is column order
    #[must_use]
    pub fn field(mut self, attr: impl Into<String>, field: Field) -> Self {
        self.fields.push((attr.into(), field));
        self
    }

    /// Derive the schema.
    ///
    /// Fails when no field or more than one field is marked as primary key,
    /// when an attribute is declared twice, or when a name is empty.
    pub fn build(self) -> std::result::Result<Schema, SchemaError> {
        let model = self.model;
        let table = self.table.unwrap_or_else(|| model.clone());
        if model.is_empty() || table.is_empty() {
            return Err(SchemaError::EmptyName { model });
        }

        let mut primary_key: Option<String> = None;
        let mut fields = Vec::new();
        let mut mappings = HashMap::with_capacity(self.fields.len());

        for (attr, mut field) in self.fields {
            if attr.is_empty() || field.name().is_some_and(str::is_empty) {
                return Err(SchemaError::EmptyName { model });
            }
            if mappings.contains_key(&attr) {
                return Err(SchemaError::DuplicateField { model, field: attr });
            }
            field.resolve_name(&attr);
            debug!(model = %model, field = %field, "found mapping");

            if field.is_primary_key() {
                if let Some(first) = primary_key {
                    return Err(SchemaError::DuplicatePrimaryKey {
                        model,
                        first,
                        second: attr,
                    });
                }
                primary_key = Some(attr.clone());
            } else {
                fields.push(attr.clone());
            }
            mappings.insert(attr, field);
        }

        let Some(primary_key) = primary_key else {
            return Err(SchemaError::MissingPrimaryKey { model });
        };

        let column = |attr: &String| -> String {
            let name = mappings
                .get(attr)
                .and_then(Field::name)
                .unwrap_or(attr.as_str());
            format!("`{name}`")
        };
        let pk = column(&primary_key);
        let columns: Vec<String> = fields.iter().map(column).collect();

        let mut selected = vec![pk.clone()];
        selected.extend(columns.iter().cloned());
        let select_sql = format!("select {} from `{}`", selected.join(", "), table);

        let mut inserted = columns.clone();
        inserted.push(pk.clone());
        let placeholders = vec!["?"; inserted.len()].join(",");
        let insert_sql = format!(
            "insert into `{}` ({}) value ({})",
            table,
            inserted.join(","),
            placeholders
        );

        // A model with only a key still gets a valid, no-op update.
        let assignments = if columns.is_empty() {
            format!("{pk}={pk}")
        } else {
            columns
                .iter()
                .map(|c| format!("{c}=?"))
                .collect::<Vec<_>>()
                .join(",")
        };
        let update_sql = format!("update `{table}` set {assignments} where {pk}=?");
        let delete_sql = format!("delete from `{table}` where {pk}=?");

        info!(model = %model, table = %table, "found model");

        Ok(Schema {
            model,
            table,
            primary_key,
            fields,
            mappings,
            select_sql,
            insert_sql,
            update_sql,
            delete_sql,
        })
    }
}

/// Per-type storage for a derived schema
///
/// Derivation runs on first access only; the outcome, success or
/// [`SchemaError`], is kept and returned on every later access.
pub struct SchemaCell {
    cell: OnceLock<std::result::Result<Schema, SchemaError>>,
}

impl SchemaCell {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Get the schema, deriving it on first use
    pub fn get_or_derive<F>(&self, derive: F) -> Result<&Schema>
    where
        F: FnOnce() -> std::result::Result<Schema, SchemaError>,
    {
        match self.cell.get_or_init(derive) {
            Ok(schema) => Ok(schema),
            Err(e) => Err(e.clone().into()),
        }
    }
}

impl Default for SchemaCell {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DatabaseError;
    use crate::core::field::next_id;

    fn user() -> SchemaBuilder {
        Schema::builder("User")
            .table("users")
            .field(
                "id",
                Field::string_ddl("varchar(50)")
                    .primary_key()
                    .default_fn(next_id),
            )
            .field("email", Field::string_ddl("varchar(50)"))
            .field("admin", Field::boolean())
    }

    #[test]
    fn test_templates() {
        let schema = user().build().unwrap();
        assert_eq!(schema.table(), "users");
        assert_eq!(schema.primary_key(), "id");
        assert_eq!(schema.fields(), ["email", "admin"]);
        assert_eq!(
            schema.select_sql(),
            "select `id`, `email`, `admin` from `users`"
        );
        assert_eq!(
            schema.insert_sql(),
            "insert into `users` (`email`,`admin`,`id`) value (?,?,?)"
        );
        assert_eq!(
            schema.update_sql(),
            "update `users` set `email`=?,`admin`=? where `id`=?"
        );
        assert_eq!(schema.delete_sql(), "delete from `users` where `id`=?");
    }

    #[test]
    fn test_table_defaults_to_model_name() {
        let schema = Schema::builder("Blog")
            .field("id", Field::integer().primary_key())
            .build()
            .unwrap();
        assert_eq!(schema.table(), "Blog");
        assert_eq!(schema.select_sql(), "select `id` from `Blog`");
    }

    #[test]
    fn test_key_only_model() {
        let schema = Schema::builder("Tag")
            .field("id", Field::string().primary_key())
            .build()
            .unwrap();
        assert_eq!(schema.insert_sql(), "insert into `Tag` (`id`) value (?)");
        assert_eq!(schema.update_sql(), "update `Tag` set `id`=`id` where `id`=?");
    }

    #[test]
    fn test_explicit_column_name() {
        let schema = Schema::builder("User")
            .field("id", Field::integer().primary_key())
            .field("email", Field::string().named("mail"))
            .build()
            .unwrap();
        assert_eq!(schema.column("email"), Some("mail"));
        assert_eq!(schema.update_sql(), "update `User` set `mail`=? where `id`=?");
    }

    #[test]
    fn test_missing_primary_key() {
        let err = Schema::builder("User")
            .field("email", Field::string())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingPrimaryKey { .. }));
    }

    #[test]
    fn test_duplicate_primary_key() {
        let err = Schema::builder("User")
            .field("email", Field::string().primary_key())
            .field("name", Field::string())
            .field("id", Field::string().primary_key())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicatePrimaryKey {
                model: "User".to_string(),
                first: "email".to_string(),
                second: "id".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_field() {
        let err = user().field("email", Field::text()).build().unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { .. }));
    }

    #[test]
    fn test_schema_cell_caches_failure() {
        static CELL: SchemaCell = SchemaCell::new();
        let mut calls = 0;
        for _ in 0..2 {
            let err = CELL
                .get_or_derive(|| {
                    calls += 1;
                    Schema::builder("Broken").build()
                })
                .unwrap_err();
            assert!(matches!(
                err,
                DatabaseError::Schema(SchemaError::MissingPrimaryKey { .. })
            ));
        }
        assert_eq!(calls, 1);
    }
}
