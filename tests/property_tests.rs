//! Property-based tests for schema derivation and placeholder handling using proptest

use proptest::prelude::*;
use rust_orm_system::core::database_types::count_placeholders;
use rust_orm_system::prelude::*;

fn attribute_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z][a-z0-9_]{0,7}", 1..8)
        .prop_map(|names| names.into_iter().collect::<Vec<_>>())
}

fn build(table: &str, names: &[String], keys: &[usize]) -> std::result::Result<Schema, SchemaError> {
    names
        .iter()
        .enumerate()
        .fold(Schema::builder("Item").table(table), |builder, (i, name)| {
            let field = if keys.contains(&i) {
                Field::string().primary_key()
            } else {
                Field::integer()
            };
            builder.field(name.clone(), field)
        })
        .build()
}

fn quoted(names: &[&String]) -> Vec<String> {
    names.iter().map(|n| format!("`{n}`")).collect()
}

// ============================================================================
// Schema Derivation
// ============================================================================

proptest! {
    /// Templates list the key first on select, last on insert, and never in the SET list
    #[test]
    fn test_templates_follow_declaration_order(
        (names, key) in attribute_names().prop_flat_map(|names| {
            let len = names.len();
            (Just(names), 0..len)
        })
    ) {
        let schema = build("items", &names, &[key]).unwrap();
        let pk = &names[key];
        let others: Vec<&String> = names.iter().filter(|n| *n != pk).collect();

        prop_assert_eq!(schema.primary_key(), pk.as_str());
        prop_assert_eq!(schema.fields().len(), others.len());

        let mut selected = vec![format!("`{pk}`")];
        selected.extend(quoted(&others));
        prop_assert_eq!(
            schema.select_sql(),
            format!("select {} from `items`", selected.join(", "))
        );

        let mut inserted = quoted(&others);
        inserted.push(format!("`{pk}`"));
        prop_assert_eq!(
            schema.insert_sql(),
            format!(
                "insert into `items` ({}) value ({})",
                inserted.join(","),
                vec!["?"; names.len()].join(",")
            )
        );

        let set_list = schema
            .update_sql()
            .split(" where ")
            .next()
            .unwrap_or_default()
            .to_string();
        let pk_set = format!("`{pk}`=");
        let pk_where = format!("where `{pk}`=?");
        if !others.is_empty() {
            prop_assert!(!set_list.contains(&pk_set));
        }
        prop_assert!(schema.update_sql().ends_with(&pk_where));
        prop_assert_eq!(schema.delete_sql(), format!("delete from `items` where `{pk}`=?"));

        // One bound argument per insert column; update binds the same set
        prop_assert_eq!(count_placeholders(schema.insert_sql()), names.len());
        prop_assert_eq!(
            count_placeholders(schema.update_sql()),
            schema.insert_order().count()
        );
    }

    /// Two key fields fail no matter where they are declared
    #[test]
    fn test_two_primary_keys_rejected(
        (names, first, second) in prop::collection::hash_set("[a-z]{1,8}", 2..8)
            .prop_map(|names| names.into_iter().collect::<Vec<_>>())
            .prop_flat_map(|names| {
                let len = names.len();
                (Just(names), 0..len, 0..len)
            })
            .prop_filter("distinct keys", |(_, a, b)| a != b)
    ) {
        let err = build("items", &names, &[first, second]).unwrap_err();
        let is_duplicate_key = matches!(err, SchemaError::DuplicatePrimaryKey { .. });
        prop_assert!(is_duplicate_key);
    }

    /// A field list without a key always fails
    #[test]
    fn test_missing_primary_key_rejected(names in attribute_names()) {
        let err = build("items", &names, &[]).unwrap_err();
        let is_missing_key = matches!(err, SchemaError::MissingPrimaryKey { .. });
        prop_assert!(is_missing_key);
    }
}

// ============================================================================
// Placeholder Translation
// ============================================================================

fn statement_with_placeholders() -> impl Strategy<Value = (String, usize)> {
    prop::collection::vec("[a-z =,()<>]{0,6}", 1..10).prop_map(|parts| {
        let count = parts.len() - 1;
        (parts.join("?"), count)
    })
}

proptest! {
    /// Every bare placeholder is counted
    #[test]
    fn test_count_bare_placeholders((sql, count) in statement_with_placeholders()) {
        prop_assert_eq!(count_placeholders(&sql), count);
    }

    /// Question marks inside quoted literals are not placeholders
    #[test]
    fn test_quoted_question_marks_ignored(
        (sql, count) in statement_with_placeholders(),
        literal in "[a-z ?]{0,10}",
    ) {
        let with_literal = format!("{sql} and `c?` = '{literal}' or \"{literal}\"");
        prop_assert_eq!(count_placeholders(&with_literal), count);

        let translated = DatabaseType::Sqlite.translate(&with_literal);
        let tail = format!(" and `c?` = '{literal}' or \"{literal}\"");
        prop_assert!(translated.ends_with(&tail));
    }

    /// MySQL statements pass through untouched
    #[test]
    fn test_mysql_translation_is_identity((sql, _) in statement_with_placeholders()) {
        prop_assert_eq!(DatabaseType::Mysql.translate(&sql), sql);
    }

    /// SQLite placeholders are numbered from one in order of appearance
    #[test]
    fn test_sqlite_placeholders_numbered((sql, count) in statement_with_placeholders()) {
        let translated = DatabaseType::Sqlite.translate(&sql);
        let numbers: Vec<usize> = translated
            .split('?')
            .skip(1)
            .map(|rest| {
                rest.chars()
                    .take_while(char::is_ascii_digit)
                    .collect::<String>()
                    .parse()
                    .unwrap_or(0)
            })
            .collect();
        prop_assert_eq!(numbers, (1..=count).collect::<Vec<_>>());
    }
}
