//! Model instances
//!
//! A model is a plain struct bound to one derived [`Schema`]. The [`Model`]
//! trait adapts it to rows at the persistence boundary and supplies the
//! class-level finders and instance-level persistence operations, all built
//! on the schema's prebuilt SQL templates.

use super::error::{DatabaseError, Result};
use super::executor::Executor;
use super::schema::Schema;
use super::value::{DatabaseRow, DatabaseValue};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Row window for [`Model::find_all`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// First `n` rows
    Count(u32),
    /// `count` rows after skipping `offset`
    Page { offset: u32, count: u32 },
}

/// Optional clauses appended to a model's select template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub where_clause: Option<String>,
    pub args: Vec<DatabaseValue>,
    pub order_by: Option<String>,
    pub limit: Option<Limit>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter with a WHERE fragment and the arguments for its placeholders
    #[must_use]
    pub fn filter(mut self, clause: impl Into<String>, args: Vec<DatabaseValue>) -> Self {
        self.where_clause = Some(clause.into());
        self.args = args;
        self
    }

    #[must_use]
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Return at most `count` rows
    #[must_use]
    pub fn limit(mut self, count: u32) -> Self {
        self.limit = Some(Limit::Count(count));
        self
    }

    /// Return `count` rows starting after `offset`
    #[must_use]
    pub fn page(mut self, offset: u32, count: u32) -> Self {
        self.limit = Some(Limit::Page { offset, count });
        self
    }
}

/// Build the statement and arguments of a `find_all` call
pub(crate) fn find_all_statement(
    schema: &Schema,
    options: &FindOptions,
) -> (String, Vec<DatabaseValue>) {
    let mut sql = schema.select_sql().to_string();
    let mut args = options.args.clone();

    if let Some(clause) = &options.where_clause {
        sql.push_str(" where ");
        sql.push_str(clause);
    }
    if let Some(order_by) = &options.order_by {
        sql.push_str(" order by ");
        sql.push_str(order_by);
    }
    match options.limit {
        Some(Limit::Count(count)) => {
            sql.push_str(" limit ?");
            args.push(count.into());
        }
        Some(Limit::Page { offset, count }) => {
            sql.push_str(" limit ?, ?");
            args.push(offset.into());
            args.push(count.into());
        }
        None => {}
    }

    (sql, args)
}

/// A struct mapped to one table
///
/// Implementors supply the schema and attribute access; everything else is
/// provided. Use [`define_model!`](crate::define_model) to generate an
/// implementation from a field list.
#[async_trait]
pub trait Model: Default + Send + Sync + 'static {
    /// Derived schema of this type, computed once on first use
    fn schema() -> Result<&'static Schema>;

    /// Current value of a declared attribute, `None` when unset
    fn value(&self, attr: &str) -> Option<DatabaseValue>;

    /// Assign a declared attribute, converting to the field's Rust type
    fn set_value(&mut self, attr: &str, value: DatabaseValue) -> Result<()>;

    /// Derive the schema now so declaration errors surface at startup
    fn register() -> Result<&'static Schema> {
        Self::schema()
    }

    /// Build an instance from a row keyed by column names
    fn from_row(mut row: DatabaseRow) -> Result<Self> {
        let schema = Self::schema()?;
        let mut instance = Self::default();
        for attr in schema.select_order() {
            let column = schema.column(attr).unwrap_or(attr);
            if let Some(value) = row.remove(column) {
                instance.set_value(attr, value)?;
            }
        }
        Ok(instance)
    }

    /// Value of a declared attribute; undeclared attributes are an error
    fn get_value(&self, attr: &str) -> Result<Option<DatabaseValue>> {
        let schema = Self::schema()?;
        if schema.field(attr).is_none() {
            return Err(DatabaseError::attribute(schema.model(), attr));
        }
        Ok(self.value(attr))
    }

    /// Value of a declared attribute, resolving and storing the field's
    /// default when it is unset. Later calls return the stored value.
    fn get_value_or_default(&mut self, attr: &str) -> Result<DatabaseValue> {
        let schema = Self::schema()?;
        let field = schema
            .field(attr)
            .ok_or_else(|| DatabaseError::attribute(schema.model(), attr))?;

        if let Some(value) = self.value(attr) {
            return Ok(value);
        }
        let value = field.resolve_default();
        debug!(model = %schema.model(), field = %attr, value = ?value, "using default value");
        self.set_value(attr, value.clone())?;
        Ok(value)
    }

    /// Find every row matching `options`, in the order the store returns them
    async fn find_all(executor: &Executor, options: FindOptions) -> Result<Vec<Self>> {
        let schema = Self::schema()?;
        let (sql, args) = find_all_statement(schema, &options);
        let rows = executor.select(&sql, &args, None).await?;
        rows.into_iter().map(Self::from_row).collect()
    }

    /// Run a single-column aggregate such as `count(id)`.
    ///
    /// Returns `None` when no row comes back or the aggregate is NULL.
    async fn find_number(
        executor: &Executor,
        select_expression: &str,
        where_clause: Option<&str>,
        args: &[DatabaseValue],
    ) -> Result<Option<DatabaseValue>> {
        let schema = Self::schema()?;
        let mut sql = format!("select {} _num_ from `{}`", select_expression, schema.table());
        if let Some(clause) = where_clause {
            sql.push_str(" where ");
            sql.push_str(clause);
        }

        let mut rows = executor.select(&sql, args, Some(1)).await?;
        Ok(rows
            .pop()
            .and_then(|mut row| row.remove("_num_"))
            .filter(|value| !value.is_null()))
    }

    /// Find the row with the given primary key
    async fn find<K>(executor: &Executor, primary_key: K) -> Result<Option<Self>>
    where
        K: Into<DatabaseValue> + Send,
    {
        let schema = Self::schema()?;
        let column = schema.column(schema.primary_key()).unwrap_or(schema.primary_key());
        let sql = format!("{} where `{}`=?", schema.select_sql(), column);

        let mut rows = executor.select(&sql, &[primary_key.into()], Some(1)).await?;
        rows.pop().map(Self::from_row).transpose()
    }

    /// Insert this instance, filling unset fields (primary key included)
    /// with their defaults. Returns the affected-row count.
    async fn save(&mut self, executor: &Executor) -> Result<u64> {
        let schema = Self::schema()?;
        let mut args = Vec::with_capacity(schema.fields().len() + 1);
        for attr in schema.insert_order() {
            args.push(self.get_value_or_default(attr)?);
        }

        let affected = executor.execute(schema.insert_sql(), &args, true).await?;
        if affected != 1 {
            warn!(model = %schema.model(), expected = 1, affected, "failed to insert record");
        }
        Ok(affected)
    }

    /// Write the current values of this instance to the row with its
    /// primary key. Returns the affected-row count.
    async fn update(&self, executor: &Executor) -> Result<u64> {
        let schema = Self::schema()?;
        let args: Vec<DatabaseValue> = schema
            .insert_order()
            .map(|attr| self.value(attr).unwrap_or(DatabaseValue::Null))
            .collect();

        let affected = executor.execute(schema.update_sql(), &args, true).await?;
        if affected != 1 {
            warn!(model = %schema.model(), expected = 1, affected, "failed to update by primary key");
        }
        Ok(affected)
    }

    /// Delete the row with this instance's primary key. Returns the
    /// affected-row count.
    async fn delete(&self, executor: &Executor) -> Result<u64> {
        let schema = Self::schema()?;
        let args = [self
            .value(schema.primary_key())
            .unwrap_or(DatabaseValue::Null)];

        let affected = executor.execute(schema.delete_sql(), &args, true).await?;
        if affected != 1 {
            warn!(model = %schema.model(), expected = 1, affected, "failed to remove by primary key");
        }
        Ok(affected)
    }
}

/// Declare a model struct and implement [`Model`] for it.
///
/// Every field becomes `Option<T>` (unset until assigned or loaded), and the
/// struct derives `Debug`, `Clone`, `Default` and `PartialEq`. The table name
/// follows `as`; without it the struct name is used.
///
/// ```
/// use rust_orm_system::core::field::{next_id, Field};
/// use rust_orm_system::core::model::Model;
/// use rust_orm_system::define_model;
///
/// define_model! {
///     pub struct User as "users" {
///         id: String => Field::string_ddl("varchar(50)").primary_key().default_fn(next_id),
///         email: String => Field::string_ddl("varchar(50)"),
///         admin: bool => Field::boolean(),
///     }
/// }
///
/// let schema = User::register().unwrap();
/// assert_eq!(schema.delete_sql(), "delete from `users` where `id`=?");
/// ```
#[macro_export]
macro_rules! define_model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $table:literal)? {
            $( $field:ident : $ty:ty => $desc:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $( pub $field: ::std::option::Option<$ty>, )+
        }

        impl $crate::core::model::Model for $name {
            fn schema() -> $crate::core::error::Result<&'static $crate::core::schema::Schema> {
                static SCHEMA: $crate::core::schema::SchemaCell =
                    $crate::core::schema::SchemaCell::new();
                SCHEMA.get_or_derive(|| {
                    $crate::core::schema::Schema::builder(stringify!($name))
                        $( .table($table) )?
                        $( .field(stringify!($field), $desc) )+
                        .build()
                })
            }

            fn value(&self, attr: &str) -> ::std::option::Option<$crate::core::value::DatabaseValue> {
                match attr {
                    $( stringify!($field) => self.$field.clone().map(::std::convert::Into::into), )+
                    _ => ::std::option::Option::None,
                }
            }

            fn set_value(
                &mut self,
                attr: &str,
                value: $crate::core::value::DatabaseValue,
            ) -> $crate::core::error::Result<()> {
                match attr {
                    $(
                        stringify!($field) => {
                            self.$field = <::std::option::Option<$ty> as $crate::core::value::FromValue>::from_value(value)?;
                            ::std::result::Result::Ok(())
                        }
                    )+
                    _ => ::std::result::Result::Err(
                        $crate::core::error::DatabaseError::attribute(stringify!($name), attr),
                    ),
                }
            }
        }
    };
}
