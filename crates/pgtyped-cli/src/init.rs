use crate::cli::InitArgs;
use crate::write::write_atomic;
use std::path::{Path, PathBuf};

const CONFIG_TEMPLATE: &str = r#"version = "1"

# Schema description files, relative to this file.
schemas = ["schema/*.toml"]

[output]
sql_file = "sql/models.sql"
orm_dir = "src/orm"

# Rust type overrides keyed by SQL type name.
[types]
# "TIMESTAMPTZ" = "chrono::DateTime<chrono::Utc>"
"#;

const SCHEMA_TEMPLATE: &str = r#"# Types: TEXT CHAR INTEGER BIGINT SMALLINT DOUBLE_PRECISION REAL BOOLEAN
#        TIMESTAMPTZ JSONB HSTORE UUID

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
unique = true

[[tables.columns]]
name = "nickname"
type = "TEXT"
nullable = true

[[tables.columns]]
name = "created_at"
type = "TIMESTAMPTZ"
constraint = "NOT NULL DEFAULT now()"

[[tables.relations]]
kind = "one_to_many"
target = "Post"
on_delete_cascade = true

[[tables]]
name = "Post"
sql_name = "posts"

[[tables.columns]]
name = "id"
type = "BIGINT"
primary_key = true

[[tables.columns]]
name = "title"
type = "TEXT"

[[tables.columns]]
name = "tags"
type = "TEXT"
array = true
"#;

pub fn run(args: InitArgs) -> anyhow::Result<()> {
    let schema = schema_path(&args.config);
    for path in [&args.config, &schema] {
        if path.exists() {
            anyhow::bail!("refusing to overwrite existing file: {}", path.display());
        }
    }

    write_atomic(&args.config, CONFIG_TEMPLATE)?;
    tracing::info!("wrote {}", args.config.display());
    write_atomic(&schema, SCHEMA_TEMPLATE)?;
    tracing::info!("wrote {}", schema.display());
    Ok(())
}

fn schema_path(config: &Path) -> PathBuf {
    config
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("schema")
        .join("example.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::schema::{SchemaFile, collect_tables};

    #[test]
    fn test_templates_parse() {
        let cfg = ProjectConfig::parse(Path::new("pgtyped.toml"), CONFIG_TEMPLATE).unwrap();
        assert_eq!(cfg.file.schemas, vec!["schema/*.toml"]);

        let tables = collect_tables(&[SchemaFile::parse(SCHEMA_TEMPLATE).unwrap()]).unwrap();
        assert_eq!(tables.len(), 2);
        assert!(tables[1].column("user_id").is_some());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("pgtyped-init-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let config = dir.join("pgtyped.toml");

        run(InitArgs {
            config: config.clone(),
        })
        .unwrap();
        assert!(dir.join("schema/example.toml").exists());

        let err = run(InitArgs { config }).unwrap_err();
        assert!(err.to_string().starts_with("refusing to overwrite"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
