use crate::cli::GenArgs;
use crate::codegen::{GeneratedFile, generate_tables};
use crate::config::ProjectConfig;
use crate::ddl;
use crate::schema::{SchemaFile, SchemaTable, collect_tables};
use crate::type_mapper::TypeMapper;
use crate::write::{WriteOptions, apply_generated_files};
use std::path::Path;

/// Load the config and every schema file it matches, then resolve tables.
pub fn load_tables(config: &Path) -> anyhow::Result<(ProjectConfig, Vec<SchemaTable>)> {
    let project = ProjectConfig::load(config)?;
    let files = project
        .schema_files()?
        .iter()
        .map(|p| SchemaFile::load(p))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let tables = collect_tables(&files)?;
    Ok((project, tables))
}

pub fn run(args: GenArgs) -> anyhow::Result<()> {
    let (project, tables) = load_tables(&args.config)?;
    let files = render(&project, &tables)?;
    let summary = apply_generated_files(
        &files,
        WriteOptions {
            dry_run: args.dry_run,
            check: args.check,
        },
    )?;
    tracing::info!(
        tables = tables.len(),
        changed = summary.changed.len(),
        written = summary.written.len(),
        "generation finished"
    );
    Ok(())
}

/// The DDL file followed by the table modules.
pub fn render(project: &ProjectConfig, tables: &[SchemaTable]) -> anyhow::Result<Vec<GeneratedFile>> {
    let mapper = TypeMapper::new(project.file.types.clone());
    for t in tables {
        log_table(t, &mapper);
    }

    let mut files = vec![GeneratedFile {
        path: project.sql_file(),
        content: ddl::schema_sql(tables),
    }];
    files.extend(generate_tables(tables, &mapper, &project.orm_dir())?);
    Ok(files)
}

fn log_table(t: &SchemaTable, mapper: &TypeMapper) {
    tracing::info!(table = %t.sql_name, name = %t.type_name(), join = t.join, "collected table");
    for c in &t.columns {
        let rust = mapper.column(c);
        tracing::info!(
            table = %t.sql_name,
            column = %c.name,
            sql_type = %c.sql_type,
            rust_type = %rust.field,
            nullable = c.nullable,
            array = c.array,
            "column"
        );
    }
    tracing::debug!(table = %t.sql_name, sql = %ddl::create_table(t), "ddl");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_gen_writes_sql_and_modules_then_checks_clean() {
        let dir = std::env::temp_dir().join(format!("pgtyped-gen-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("schema")).unwrap();
        std::fs::write(
            dir.join("pgtyped.toml"),
            "version = \"1\"\nschemas = [\"schema/*.toml\"]\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("schema/shop.toml"),
            "[[tables]]\nname = \"Item\"\n[[tables.columns]]\nname = \"id\"\ntype = \"BIGINT\"\nprimary_key = true\n",
        )
        .unwrap();

        let config: PathBuf = dir.join("pgtyped.toml");
        run(GenArgs {
            config: config.clone(),
            dry_run: false,
            check: false,
        })
        .unwrap();

        let sql = std::fs::read_to_string(dir.join("sql/models.sql")).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"item\" (\n\tid BIGINT PRIMARY KEY NOT NULL\n);\n"
        );
        assert!(dir.join("src/orm/item.rs").exists());
        assert!(dir.join("src/orm/mod.rs").exists());

        run(GenArgs {
            config,
            dry_run: false,
            check: true,
        })
        .unwrap();
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_schema_files_is_an_error() {
        let project = ProjectConfig::parse(
            Path::new("/nonexistent/pgtyped.toml"),
            "version = \"1\"\nschemas = [\"schema/*.toml\"]\n",
        )
        .unwrap();
        let err = project.schema_files().unwrap_err();
        assert_eq!(
            err.to_string(),
            "schema pattern matched no files: schema/*.toml"
        );
    }
}
