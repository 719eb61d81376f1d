use crate::schema::SchemaTable;
use crate::type_mapper::{RustColumn, TypeMapper};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

const HEADER: &str = "// @generated by pgtyped (pgtyped-cli). Do not edit.\n\n";

/// One module per table plus a `mod.rs` re-exporting every table struct.
pub fn generate_tables(
    tables: &[SchemaTable],
    mapper: &TypeMapper,
    out_dir: &Path,
) -> anyhow::Result<Vec<GeneratedFile>> {
    let mut files = Vec::with_capacity(tables.len() + 1);
    let mut modules = Vec::with_capacity(tables.len());
    let mut seen = HashSet::new();

    for t in tables {
        let module = sanitize_ident(&t.sql_name);
        if !seen.insert(module.clone()) {
            anyhow::bail!("duplicate table module: {module}");
        }
        files.push(GeneratedFile {
            path: out_dir.join(format!("{}.rs", module.trim_start_matches("r#"))),
            content: table_module(t, mapper)?,
        });
        modules.push((module, t.type_name()));
    }

    let mut mod_rs = String::from(HEADER);
    for (module, _) in &modules {
        let _ = writeln!(mod_rs, "pub mod {module};");
    }
    mod_rs.push('\n');
    for (module, ty) in &modules {
        let _ = writeln!(mod_rs, "pub use {module}::{{{ty}, {ty}Record, {ty}Tag}};");
    }
    files.push(GeneratedFile {
        path: out_dir.join("mod.rs"),
        content: mod_rs,
    });

    Ok(files)
}

/// Marker type, record struct with its `Record` impl, and the table struct
/// holding a typed handle per column.
pub fn table_module(t: &SchemaTable, mapper: &TypeMapper) -> anyhow::Result<String> {
    let ty = t.type_name();
    let tag = format!("{ty}Tag");
    let record = format!("{ty}Record");

    let mut fields: Vec<(String, &str, RustColumn)> = Vec::with_capacity(t.columns.len());
    let mut seen = HashSet::new();
    for c in &t.columns {
        let ident = sanitize_ident(&c.name);
        if ident == "table" {
            anyhow::bail!("column {}.table clashes with the table handle", t.sql_name);
        }
        if !seen.insert(ident.clone()) {
            anyhow::bail!("duplicate field name in {}: {ident}", t.sql_name);
        }
        fields.push((ident, c.name.as_str(), mapper.column(c)));
    }

    let mut out = String::from(HEADER);
    out.push_str("use pgtyped::prelude::*;\n");
    out.push_str("use pgtyped::tokio_postgres::Row;\n\n");

    let _ = writeln!(out, "#[derive(Debug, Clone, Copy)]\npub struct {tag};\n");

    let _ = writeln!(out, "#[derive(Debug, Clone, Default, PartialEq)]");
    let _ = writeln!(out, "pub struct {record} {{");
    for (ident, _, rc) in &fields {
        let _ = writeln!(out, "    pub {ident}: {},", rc.field);
    }
    out.push_str("}\n\n");

    let _ = writeln!(out, "impl Record for {record} {{");
    out.push_str(
        "    fn scan_column(&mut self, column: &str, row: &Row, idx: usize) -> OrmResult<()> {\n",
    );
    out.push_str("        match column {\n");
    for (ident, name, _) in &fields {
        let _ = writeln!(
            out,
            "            \"{name}\" => self.{ident} = row.try_get_at(idx, column)?,"
        );
    }
    out.push_str("            _ => return Err(OrmError::decode(column, \"unknown column\")),\n");
    out.push_str("        }\n        Ok(())\n    }\n\n");
    out.push_str("    fn column_value(&self, column: &str) -> Option<Param> {\n");
    out.push_str("        match column {\n");
    for (ident, name, rc) in &fields {
        let value = if rc.copy {
            format!("self.{ident}")
        } else {
            format!("self.{ident}.clone()")
        };
        let _ = writeln!(
            out,
            "            \"{name}\" => Some(Param::new({value})),"
        );
    }
    out.push_str("            _ => None,\n        }\n    }\n}\n\n");

    let _ = writeln!(out, "pub struct {ty} {{");
    let _ = writeln!(out, "    pub table: TableDef<{tag}>,");
    for (ident, _, rc) in &fields {
        let _ = writeln!(
            out,
            "    pub {ident}: Column<{tag}, {}, {}, {}>,",
            rc.value, rc.kind, rc.nullability
        );
    }
    out.push_str("}\n\n");

    let _ = writeln!(out, "impl {ty} {{");
    out.push_str("    pub fn new() -> Self {\n        Self {\n");
    let _ = writeln!(out, "            table: TableDef::new(\n                \"{}\",", t.sql_name);
    out.push_str("                vec![\n");
    for c in &t.columns {
        let mut d = format!(
            "ColumnDescriptor::new(\"{}\", SqlType::{:?})",
            c.name, c.sql_type
        );
        if c.nullable {
            d.push_str(".nullable()");
        }
        if c.array {
            d.push_str(".array()");
        }
        let _ = writeln!(out, "                    {d},");
    }
    out.push_str("                ],\n            ),\n");
    for (ident, name, _) in &fields {
        let _ = writeln!(out, "            {ident}: Column::new(\"{name}\"),");
    }
    out.push_str("        }\n    }\n\n");
    let _ = writeln!(
        out,
        "    pub fn repository(&self) -> Repository<{tag}, {record}> {{"
    );
    out.push_str("        Repository::new(self.table.clone())\n    }\n}\n\n");

    let _ = writeln!(out, "impl Default for {ty} {{");
    out.push_str("    fn default() -> Self {\n        Self::new()\n    }\n}\n");

    Ok(out)
}

fn sanitize_ident(name: &str) -> String {
    let mut s = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();
    s = heck::ToSnakeCase::to_snake_case(s.as_str());
    if s.is_empty() {
        s.push('_');
    }
    if s.starts_with(|c: char| c.is_ascii_digit()) {
        s.insert(0, '_');
    }
    if is_rust_keyword(&s) {
        format!("r#{s}")
    } else {
        s
    }
}

fn is_rust_keyword(s: &str) -> bool {
    matches!(
        s,
        "as" | "async"
            | "await"
            | "break"
            | "const"
            | "continue"
            | "crate"
            | "dyn"
            | "else"
            | "enum"
            | "extern"
            | "false"
            | "fn"
            | "for"
            | "if"
            | "impl"
            | "in"
            | "let"
            | "loop"
            | "match"
            | "mod"
            | "move"
            | "mut"
            | "pub"
            | "ref"
            | "return"
            | "static"
            | "struct"
            | "trait"
            | "true"
            | "type"
            | "unsafe"
            | "use"
            | "where"
            | "while"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaFile, collect_tables};

    const SCHEMA: &str = r#"
[[tables]]
name = "User"
sql_name = "users"

[[tables.columns]]
name = "id"
type = "BIGINT"
primary_key = true

[[tables.columns]]
name = "email"
type = "TEXT"

[[tables.columns]]
name = "type"
type = "TEXT"
nullable = true

[[tables.columns]]
name = "tags"
type = "TEXT"
array = true

[[tables.relations]]
kind = "one_to_many"
target = "Order"

[[tables]]
name = "Order"
sql_name = "orders"

[[tables.columns]]
name = "id"
type = "BIGINT"
"#;

    fn tables() -> Vec<SchemaTable> {
        collect_tables(&[SchemaFile::parse(SCHEMA).unwrap()]).unwrap()
    }

    #[test]
    fn test_table_module_shape() {
        let src = table_module(&tables()[0], &TypeMapper::default()).unwrap();
        assert!(src.starts_with("// @generated by pgtyped"));
        assert!(src.contains("pub struct UserTag;"));
        assert!(src.contains("pub struct UserRecord {\n    pub id: i64,\n    pub email: String,\n    pub r#type: Option<String>,\n    pub tags: Vec<String>,\n}"));
        assert!(src.contains("\"type\" => self.r#type = row.try_get_at(idx, column)?,"));
        assert!(src.contains("\"id\" => Some(Param::new(self.id)),"));
        assert!(src.contains("\"email\" => Some(Param::new(self.email.clone())),"));
        assert!(src.contains("    pub id: Column<UserTag, i64, Ordinal, NotNull>,"));
        assert!(src.contains("    pub r#type: Column<UserTag, String, Text, Nullable>,"));
        assert!(src.contains("    pub tags: Column<UserTag, Vec<String>, Opaque, NotNull>,"));
        assert!(src.contains("ColumnDescriptor::new(\"type\", SqlType::Text).nullable(),"));
        assert!(src.contains("ColumnDescriptor::new(\"tags\", SqlType::Text).array(),"));
        assert!(src.contains("pub fn repository(&self) -> Repository<UserTag, UserRecord> {"));
    }

    #[test]
    fn test_relation_columns_are_emitted() {
        let src = table_module(&tables()[1], &TypeMapper::default()).unwrap();
        assert!(src.contains("    pub user_id: Column<OrderTag, i64, Ordinal, NotNull>,"));
        assert!(src.contains("user_id: Column::new(\"user_id\"),"));
    }

    #[test]
    fn test_generate_tables_writes_mod_rs() {
        let files = generate_tables(&tables(), &TypeMapper::default(), Path::new("src/orm")).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("src/orm/users.rs"),
                PathBuf::from("src/orm/orders.rs"),
                PathBuf::from("src/orm/mod.rs"),
            ]
        );
        let mod_rs = &files[2].content;
        assert!(mod_rs.contains("pub mod users;\npub mod orders;\n"));
        assert!(mod_rs.contains("pub use users::{User, UserRecord, UserTag};"));
    }

    #[test]
    fn test_column_named_table_is_rejected() {
        let mut t = tables().remove(1);
        t.columns[0].name = "table".to_string();
        let err = table_module(&t, &TypeMapper::default()).unwrap_err();
        assert!(err.to_string().contains("clashes with the table handle"));
    }

    #[test]
    fn test_sanitize_ident() {
        assert_eq!(sanitize_ident("displayName"), "display_name");
        assert_eq!(sanitize_ident("1st"), "_1st");
        assert_eq!(sanitize_ident("match"), "r#match");
    }
}
