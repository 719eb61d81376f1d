use crate::schema::{SchemaColumn, SchemaTable};
use pgtyped::SqlType;

/// `CREATE TABLE IF NOT EXISTS` statement for one table.
pub fn create_table(table: &SchemaTable) -> String {
    let mut lines: Vec<String> = table.columns.iter().map(column_line).collect();
    lines.extend(table.constraints.iter().map(|c| format!("\t{c}")));
    format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n{}\n);\n",
        table.sql_name,
        lines.join(",\n")
    )
}

/// DDL for every table, in order, separated by blank lines.
pub fn schema_sql(tables: &[SchemaTable]) -> String {
    tables
        .iter()
        .map(create_table)
        .collect::<Vec<_>>()
        .join("\n")
}

fn column_line(c: &SchemaColumn) -> String {
    let mut ty = c.sql_type.sql_name().to_string();
    if c.array {
        ty.push_str("[]");
    }
    format!("\t{} {ty}{}", c.name, column_constraints(c))
}

fn column_constraints(c: &SchemaColumn) -> String {
    if let Some(explicit) = &c.constraint {
        return format!(" {explicit}");
    }
    let mut out = String::new();
    if c.primary_key {
        out.push_str(" PRIMARY KEY");
    }
    if c.unique {
        out.push_str(" UNIQUE");
    }
    out.push_str(if c.nullable { " NULL" } else { " NOT NULL" });
    if let Some(default) = c.default.clone().or_else(|| implied_default(c)) {
        out.push_str(" DEFAULT ");
        out.push_str(&default);
    }
    out
}

/// Default for columns that declare none. Keys and virtual columns get none.
fn implied_default(c: &SchemaColumn) -> Option<String> {
    if c.primary_key || c.virtual_column {
        return None;
    }
    if c.array {
        return (!c.nullable).then(|| "'{}'".to_string());
    }
    if c.nullable {
        return Some("null".to_string());
    }
    match c.sql_type {
        SqlType::Integer
        | SqlType::BigInt
        | SqlType::SmallInt
        | SqlType::DoublePrecision
        | SqlType::Real => Some("0".to_string()),
        SqlType::Boolean => Some("FALSE".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaFile, collect_tables};

    fn column(name: &str, sql_type: SqlType) -> SchemaColumn {
        SchemaColumn {
            name: name.to_string(),
            sql_type,
            nullable: false,
            array: false,
            primary_key: false,
            unique: false,
            default: None,
            constraint: None,
            virtual_column: false,
        }
    }

    #[test]
    fn test_implied_defaults() {
        let mut tags = column("tags", SqlType::Text);
        tags.array = true;
        let mut note = column("note", SqlType::Text);
        note.nullable = true;
        let table = SchemaTable {
            name: "Item".to_string(),
            sql_name: "item".to_string(),
            columns: vec![
                column("count", SqlType::Integer),
                column("active", SqlType::Boolean),
                column("title", SqlType::Text),
                tags,
                note,
            ],
            constraints: vec![],
            join: false,
        };
        assert_eq!(
            create_table(&table),
            "CREATE TABLE IF NOT EXISTS \"item\" (\n\
             \tcount INTEGER NOT NULL DEFAULT 0,\n\
             \tactive BOOLEAN NOT NULL DEFAULT FALSE,\n\
             \ttitle TEXT NOT NULL,\n\
             \ttags TEXT[] NOT NULL DEFAULT '{}',\n\
             \tnote TEXT NULL DEFAULT null\n\
             );\n"
        );
    }

    #[test]
    fn test_explicit_constraint_replaces_generated_ones() {
        let mut id = column("id", SqlType::BigInt);
        id.primary_key = true;
        let mut email = column("email", SqlType::Text);
        email.unique = true;
        email.default = Some("''".to_string());
        let mut created = column("created_at", SqlType::Timestamptz);
        created.constraint = Some("NOT NULL DEFAULT now()".to_string());
        let table = SchemaTable {
            name: "User".to_string(),
            sql_name: "users".to_string(),
            columns: vec![id, email, created],
            constraints: vec!["CHECK (email <> '')".to_string()],
            join: false,
        };
        assert_eq!(
            create_table(&table),
            "CREATE TABLE IF NOT EXISTS \"users\" (\n\
             \tid BIGINT PRIMARY KEY NOT NULL,\n\
             \temail TEXT UNIQUE NOT NULL DEFAULT '',\n\
             \tcreated_at TIMESTAMPTZ NOT NULL DEFAULT now(),\n\
             \tCHECK (email <> '')\n\
             );\n"
        );
    }

    #[test]
    fn test_join_table_ddl() {
        let raw = r#"
[[tables]]
name = "Post"
[[tables.columns]]
name = "id"
type = "BIGINT"
primary_key = true
[[tables.relations]]
kind = "many_to_many"
target = "Tag"
on_delete_cascade = true
back_on_delete_cascade = true

[[tables]]
name = "Tag"
[[tables.columns]]
name = "id"
type = "BIGINT"
primary_key = true
"#;
        let tables = collect_tables(&[SchemaFile::parse(raw).unwrap()]).unwrap();
        assert_eq!(
            create_table(&tables[2]),
            "CREATE TABLE IF NOT EXISTS \"tag_post\" (\n\
             \ttag_id BIGINT NOT NULL REFERENCES tag (id) ON DELETE CASCADE,\n\
             \tpost_id BIGINT NOT NULL REFERENCES post (id) ON DELETE CASCADE,\n\
             \tUNIQUE (tag_id, post_id)\n\
             );\n"
        );
    }
}
