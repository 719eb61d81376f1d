use heck::{ToSnakeCase, ToUpperCamelCase};
use pgtyped::{ColumnDescriptor, SqlType};
use serde::Deserialize;
use std::path::Path;

/// One schema description file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

impl SchemaFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read schema file {}: {e}", path.display()))?;
        Self::parse(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse schema file {}: {e}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub sql_name: Option<String>,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub virtual_columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub relations: Vec<RelationSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: Option<SqlType>,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub unique: bool,
    pub default: Option<String>,
    /// Replaces every generated column constraint when set.
    pub constraint: Option<String>,
    #[serde(default)]
    pub skip: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RelationSpec {
    /// Each row of `target` points back at one row of the declaring table.
    OneToMany {
        target: String,
        ref_name: Option<String>,
        /// Reference an existing `target` column named by `ref_name` instead of adding one.
        #[serde(default)]
        existing_field: bool,
        #[serde(default)]
        on_delete_cascade: bool,
        constraint: Option<String>,
    },
    /// Rows of both tables are linked through a synthesized join table.
    ManyToMany {
        target: String,
        join_table: Option<String>,
        #[serde(default)]
        on_delete_cascade: bool,
        #[serde(default)]
        back_on_delete_cascade: bool,
        ref_constraint: Option<String>,
        back_ref_constraint: Option<String>,
        #[serde(default)]
        constraints: Vec<String>,
        #[serde(default)]
        virtual_columns: Vec<ColumnSpec>,
    },
}

/// A table ready for DDL and code emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaTable {
    pub name: String,
    pub sql_name: String,
    pub columns: Vec<SchemaColumn>,
    pub constraints: Vec<String>,
    /// Synthesized by a many-to-many relation.
    pub join: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaColumn {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub array: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default: Option<String>,
    pub constraint: Option<String>,
    /// Declared as a virtual column or added by a relation.
    pub virtual_column: bool,
}

impl SchemaTable {
    /// Type name used for the generated table struct.
    pub fn type_name(&self) -> String {
        self.name.to_upper_camel_case()
    }

    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl SchemaColumn {
    pub fn descriptor(&self) -> ColumnDescriptor {
        let mut d = ColumnDescriptor::new(self.name.as_str(), self.sql_type);
        d.nullable = self.nullable;
        d.array = self.array;
        d
    }

    fn from_spec(table: &str, spec: &ColumnSpec) -> anyhow::Result<Self> {
        let Some(sql_type) = spec.sql_type else {
            anyhow::bail!("column {table}.{} has no type", spec.name);
        };
        Ok(Self::with_type(spec, sql_type, false))
    }

    fn from_virtual_spec(table: &str, spec: &ColumnSpec) -> Self {
        let Some(sql_type) = spec.sql_type else {
            panic!("virtual column must have sql type: {table}.{}", spec.name);
        };
        Self::with_type(spec, sql_type, true)
    }

    fn with_type(spec: &ColumnSpec, sql_type: SqlType, virtual_column: bool) -> Self {
        Self {
            name: spec.name.to_snake_case(),
            sql_type,
            nullable: spec.nullable,
            array: spec.array,
            primary_key: spec.primary_key,
            unique: spec.unique,
            default: spec.default.clone(),
            constraint: spec.constraint.clone(),
            virtual_column,
        }
    }

    /// A relation column copying the type of `like` with a fixed constraint.
    fn reference(name: String, like: &SchemaColumn, constraint: String) -> Self {
        Self {
            name,
            sql_type: like.sql_type,
            nullable: like.nullable,
            array: like.array,
            primary_key: false,
            unique: false,
            default: None,
            constraint: Some(constraint),
            virtual_column: true,
        }
    }
}

/// Build the table list from parsed schema files: drop skipped columns, add
/// virtual columns, then resolve relations in declaration order.
///
/// # Panics
///
/// On virtual columns without a type and on relations naming unknown tables or
/// columns.
pub fn collect_tables(files: &[SchemaFile]) -> anyhow::Result<Vec<SchemaTable>> {
    let specs: Vec<&TableSpec> = files.iter().flat_map(|f| f.tables.iter()).collect();

    let mut tables = Vec::with_capacity(specs.len());
    for spec in &specs {
        if tables.iter().any(|t: &SchemaTable| t.name == spec.name) {
            anyhow::bail!("duplicate table: {}", spec.name);
        }
        let mut columns = Vec::with_capacity(spec.columns.len() + spec.virtual_columns.len());
        for c in spec.columns.iter().filter(|c| !c.skip) {
            columns.push(SchemaColumn::from_spec(&spec.name, c)?);
        }
        for c in &spec.virtual_columns {
            columns.push(SchemaColumn::from_virtual_spec(&spec.name, c));
        }
        tables.push(SchemaTable {
            name: spec.name.clone(),
            sql_name: spec
                .sql_name
                .clone()
                .unwrap_or_else(|| spec.name.to_snake_case()),
            columns,
            constraints: spec.constraints.clone(),
            join: false,
        });
    }

    for spec in &specs {
        for rel in &spec.relations {
            apply_relation(&mut tables, &spec.name, rel);
        }
    }

    Ok(tables)
}

fn table_index(tables: &[SchemaTable], name: &str, role: &str, source: &str) -> usize {
    match tables.iter().position(|t| t.name == name) {
        Some(i) => i,
        None => panic!("{role} table {name} for relation of {source} not found"),
    }
}

fn id_column(table: &SchemaTable, source: &str) -> SchemaColumn {
    match table.column("id") {
        Some(c) => c.clone(),
        None => panic!(
            "'id' column of {} for relation of {source} not found",
            table.name
        ),
    }
}

fn on_delete(cascade: bool) -> &'static str {
    if cascade { " ON DELETE CASCADE" } else { "" }
}

fn apply_relation(tables: &mut Vec<SchemaTable>, source: &str, rel: &RelationSpec) {
    match rel {
        RelationSpec::OneToMany {
            target,
            ref_name,
            existing_field,
            on_delete_cascade,
            constraint,
        } => {
            let src = table_index(tables, source, "source", source);
            let dst = table_index(tables, target, "target", source);
            let source_id = id_column(&tables[src], source);

            if *existing_field {
                let Some(ref_name) = ref_name else {
                    panic!("relation {source} -> {target} references an existing column but ref_name is empty");
                };
                if tables[dst].column(ref_name).is_none() {
                    panic!("target column {target}.{ref_name} for relation of {source} not found");
                }
                return;
            }

            let name = ref_name
                .clone()
                .unwrap_or_else(|| format!("{}_id", source.to_snake_case()));
            let constraint = constraint.clone().unwrap_or_else(|| {
                format!(
                    "REFERENCES {} (id){}",
                    tables[src].sql_name,
                    on_delete(*on_delete_cascade)
                )
            });
            tables[dst]
                .columns
                .push(SchemaColumn::reference(name, &source_id, constraint));
        }
        RelationSpec::ManyToMany {
            target,
            join_table,
            on_delete_cascade,
            back_on_delete_cascade,
            ref_constraint,
            back_ref_constraint,
            constraints,
            virtual_columns,
        } => {
            let src = table_index(tables, source, "source", source);
            let dst = table_index(tables, target, "target", source);
            let source_id = id_column(&tables[src], source);
            let target_id = id_column(&tables[dst], source);
            let source_sql = tables[src].sql_name.clone();
            let target_sql = tables[dst].sql_name.clone();

            let forward_name = format!("{target_sql}_id");
            let backward_name = format!("{source_sql}_id");
            let forward = SchemaColumn::reference(
                forward_name.clone(),
                &target_id,
                ref_constraint.clone().unwrap_or_else(|| {
                    format!(
                        "NOT NULL REFERENCES {target_sql} (id){}",
                        on_delete(*on_delete_cascade)
                    )
                }),
            );
            let backward = SchemaColumn::reference(
                backward_name.clone(),
                &source_id,
                back_ref_constraint.clone().unwrap_or_else(|| {
                    format!(
                        "NOT NULL REFERENCES {source_sql} (id){}",
                        on_delete(*back_on_delete_cascade)
                    )
                }),
            );

            let name = join_table
                .clone()
                .unwrap_or_else(|| format!("{}{}", tables[dst].name, tables[src].name));
            let mut columns = vec![forward, backward];
            for c in virtual_columns {
                columns.push(SchemaColumn::from_virtual_spec(&name, c));
            }
            let constraints = if constraints.is_empty() {
                vec![format!("UNIQUE ({forward_name}, {backward_name})")]
            } else {
                constraints.clone()
            };

            tables.push(SchemaTable {
                sql_name: name.to_snake_case(),
                name,
                columns,
                constraints,
                join: true,
            });
        }
    }
}
