//! Database type definitions
//!
//! This module defines the supported stores and how the portable `?`
//! placeholder of the SQL templates maps onto each driver's native syntax.

use super::error::DatabaseError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// MySQL/MariaDB database
    #[default]
    Mysql,
    /// SQLite database
    Sqlite,
}

impl DatabaseType {
    /// Convert database type to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            DatabaseType::Mysql => "mysql",
            DatabaseType::Sqlite => "sqlite",
        }
    }

    /// Rewrite a statement written with portable `?` placeholders into this
    /// store's native parameter syntax.
    ///
    /// MySQL takes `?` as-is. SQLite gets numbered `?N` parameters, and the
    /// MySQL-only `value (...)` row constructor of an insert is emitted as
    /// `values (...)`. A `value` column name or any nested `value` is left
    /// alone. Quoted literals and identifiers are copied untouched.
    pub fn translate(&self, sql: &str) -> String {
        if *self == DatabaseType::Mysql {
            return sql.to_string();
        }

        let is_insert = sql
            .trim_start()
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("insert"));

        let mut out = String::with_capacity(sql.len() + 8);
        let mut index = 0usize;
        let mut depth = 0usize;
        let mut chars = sql.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '\'' | '"' | '`' => {
                    out.push(c);
                    copy_quoted(c, &mut chars, &mut out);
                }
                '?' => {
                    index += 1;
                    out.push('?');
                    out.push_str(&index.to_string());
                }
                '(' => {
                    depth += 1;
                    out.push(c);
                }
                ')' => {
                    depth = depth.saturating_sub(1);
                    out.push(c);
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let mut word = String::from(c);
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_alphanumeric() || next == '_' {
                            word.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }
                    let row_constructor = is_insert
                        && depth == 0
                        && word.eq_ignore_ascii_case("value")
                        && chars.clone().find(|c| !c.is_whitespace()) == Some('(');
                    if row_constructor {
                        out.push_str("values");
                    } else {
                        out.push_str(&word);
                    }
                }
                _ => out.push(c),
            }
        }

        out
    }
}

/// Count the portable `?` placeholders of a statement, skipping any that
/// appear inside quoted literals or identifiers.
pub fn count_placeholders(sql: &str) -> usize {
    let mut count = 0;
    let mut sink = String::new();
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                sink.clear();
                copy_quoted(c, &mut chars, &mut sink);
            }
            '?' => count += 1,
            _ => {}
        }
    }

    count
}

/// Copy a quoted run up to and including its closing quote.
fn copy_quoted<I>(quote: char, chars: &mut std::iter::Peekable<I>, out: &mut String)
where
    I: Iterator<Item = char>,
{
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '\\' && quote != '`' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else if c == quote {
            break;
        }
    }
}

impl FromStr for DatabaseType {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseType::Mysql),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            other => Err(DatabaseError::config(format!(
                "unknown database backend: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_parse() {
        assert_eq!("MySQL".parse::<DatabaseType>().unwrap(), DatabaseType::Mysql);
        assert_eq!("sqlite3".parse::<DatabaseType>().unwrap(), DatabaseType::Sqlite);
        assert!("redis".parse::<DatabaseType>().is_err());
        assert_eq!(DatabaseType::default(), DatabaseType::Mysql);
    }

    #[test]
    fn test_count_placeholders_skips_quotes() {
        assert_eq!(count_placeholders("select * from `t` where `a`=? and `b`=?"), 2);
        assert_eq!(count_placeholders("select '?' from `t?` where `a`=?"), 1);
        assert_eq!(count_placeholders(r"select 'it\'s ?' where x=?"), 1);
        assert_eq!(count_placeholders("select 1"), 0);
    }

    #[test]
    fn test_mysql_translation_is_identity() {
        let sql = "insert into `users` (`email`, `id`) value (?, ?)";
        assert_eq!(DatabaseType::Mysql.translate(sql), sql);
    }

    #[test]
    fn test_sqlite_translation() {
        let sql = "insert into `users` (`email`, `value`, `id`) value (?, ?, ?)";
        assert_eq!(
            DatabaseType::Sqlite.translate(sql),
            "insert into `users` (`email`, `value`, `id`) values (?1, ?2, ?3)"
        );

        let sql = "insert into kv (key, value) value (?, ?)";
        assert_eq!(
            DatabaseType::Sqlite.translate(sql),
            "insert into kv (key, value) values (?1, ?2)"
        );

        let sql = "select `id`, `value` from `t` where `name`='?' and `id`=?";
        assert_eq!(
            DatabaseType::Sqlite.translate(sql),
            "select `id`, `value` from `t` where `name`='?' and `id`=?1"
        );
    }

    #[test]
    fn test_sqlite_translation_keeps_value_columns() {
        let sql = "insert into kv (key, value) values (?, ?)";
        assert_eq!(
            DatabaseType::Sqlite.translate(sql),
            "insert into kv (key, value) values (?1, ?2)"
        );

        let sql = "insert into kv (key, value) select ?, ?";
        assert_eq!(
            DatabaseType::Sqlite.translate(sql),
            "insert into kv (key, value) select ?1, ?2"
        );

        let sql = "insert into kv (key, value) select key, value from other where key=?";
        assert_eq!(
            DatabaseType::Sqlite.translate(sql),
            "insert into kv (key, value) select key, value from other where key=?1"
        );

        let sql = "insert into kv (key, value) values (?, upper(value (?)))";
        assert_eq!(
            DatabaseType::Sqlite.translate(sql),
            "insert into kv (key, value) values (?1, upper(value (?2)))"
        );
    }
}
