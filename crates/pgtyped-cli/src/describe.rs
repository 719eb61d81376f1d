use crate::cli::ConfigArgs;
use crate::generate::load_tables;
use crate::schema::SchemaTable;
use crate::type_mapper::TypeMapper;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    let (project, tables) = load_tables(&args.config)?;
    let mapper = TypeMapper::new(project.file.types.clone());
    for t in &tables {
        println!("{}", title(t));
        println!("{}", describe_table(t, &mapper));
        println!();
    }
    Ok(())
}

fn title(t: &SchemaTable) -> String {
    if t.join {
        format!("{} ({}, join table)", t.sql_name, t.type_name())
    } else {
        format!("{} ({})", t.sql_name, t.type_name())
    }
}

/// One row per column: SQL and Rust types, flags and the operator traits its
/// handle implements.
pub fn describe_table(t: &SchemaTable, mapper: &TypeMapper) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            ["Column", "SQL type", "Rust type", "Nullable", "Array", "Operators"]
                .into_iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold).fg(Color::Cyan)),
        );

    for c in &t.columns {
        let rust = mapper.column(c);
        let ops = c
            .descriptor()
            .capabilities()
            .iter()
            .map(|cap| cap.trait_name())
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            Cell::new(&c.name).fg(Color::Yellow),
            Cell::new(c.sql_type.sql_name()),
            Cell::new(&rust.field),
            Cell::new(yes_no(c.nullable)),
            Cell::new(yes_no(c.array)),
            Cell::new(ops).fg(Color::DarkGrey),
        ]);
    }
    table
}

fn yes_no(v: bool) -> &'static str {
    if v { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaFile, collect_tables};

    #[test]
    fn test_describe_lists_operator_groups() {
        let raw = r#"
[[tables]]
name = "User"
[[tables.columns]]
name = "email"
type = "TEXT"
nullable = true
[[tables.columns]]
name = "meta"
type = "JSONB"
"#;
        let tables = collect_tables(&[SchemaFile::parse(raw).unwrap()]).unwrap();
        let mut table = describe_table(&tables[0], &TypeMapper::default());
        table.force_no_tty();
        let out = table.to_string();
        for op in ["CommonOperator", "ScalarOperator", "LikeOperator", "NullOperator"] {
            assert!(out.contains(op), "{op} missing from\n{out}");
        }
        assert!(out.contains("Option<String>"));
        assert!(out.contains("JSONB"));
        assert_eq!(title(&tables[0]), "user (User)");
    }
}
