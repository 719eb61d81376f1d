use crate::schema::SchemaColumn;
use pgtyped::SqlType;
use std::collections::BTreeMap;

/// Rust-side shape of one column in generated code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RustColumn {
    /// Value type parameter of the typed column handle.
    pub value: String,
    /// Type of the record field.
    pub field: String,
    /// `Opaque`, `Ordinal` or `Text`.
    pub kind: &'static str,
    /// `NotNull` or `Nullable`.
    pub nullability: &'static str,
    /// The record field can be passed by value without `clone()`.
    pub copy: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    /// Overrides from `[types]` (SQL type name -> Rust type).
    custom: BTreeMap<String, String>,
}

impl TypeMapper {
    pub fn new(custom: BTreeMap<String, String>) -> Self {
        let custom = custom
            .into_iter()
            .map(|(k, v)| (normalize_sql_name(&k), v))
            .collect();
        Self { custom }
    }

    /// Element type for `sql_type`.
    pub fn map(&self, sql_type: SqlType) -> String {
        if let Some(t) = self.custom.get(sql_type.sql_name()) {
            return t.clone();
        }
        builtin(sql_type).to_string()
    }

    pub fn column(&self, c: &SchemaColumn) -> RustColumn {
        let base = self.map(c.sql_type);
        let custom = self.custom.contains_key(c.sql_type.sql_name());
        let value = if c.array { format!("Vec<{base}>") } else { base };
        let field = if c.nullable {
            format!("Option<{value}>")
        } else {
            value.clone()
        };
        RustColumn {
            value,
            field,
            kind: value_kind(c),
            nullability: if c.nullable { "Nullable" } else { "NotNull" },
            copy: !c.array && !custom && is_copy(c.sql_type),
        }
    }
}

/// Marker matching the operator groups the column descriptor allows.
pub fn value_kind(c: &SchemaColumn) -> &'static str {
    if c.array || !c.sql_type.is_scalar() {
        "Opaque"
    } else if c.sql_type.is_text_like() {
        "Text"
    } else {
        "Ordinal"
    }
}

fn builtin(sql_type: SqlType) -> &'static str {
    match sql_type {
        SqlType::Text | SqlType::Char => "String",
        SqlType::Integer => "i32",
        SqlType::BigInt => "i64",
        SqlType::SmallInt => "i16",
        SqlType::DoublePrecision => "f64",
        SqlType::Real => "f32",
        SqlType::Boolean => "bool",
        SqlType::Timestamptz => "pgtyped::chrono::DateTime<pgtyped::chrono::Utc>",
        SqlType::Jsonb => "pgtyped::serde_json::Value",
        SqlType::Hstore => "std::collections::HashMap<String, Option<String>>",
        SqlType::Uuid => "pgtyped::uuid::Uuid",
    }
}

fn is_copy(sql_type: SqlType) -> bool {
    !matches!(
        sql_type,
        SqlType::Text | SqlType::Char | SqlType::Jsonb | SqlType::Hstore
    )
}

fn normalize_sql_name(name: &str) -> String {
    let s = name.split_whitespace().collect::<Vec<_>>().join(" ");
    s.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(sql_type: SqlType, nullable: bool, array: bool) -> SchemaColumn {
        SchemaColumn {
            name: "c".to_string(),
            sql_type,
            nullable,
            array,
            primary_key: false,
            unique: false,
            default: None,
            constraint: None,
            virtual_column: false,
        }
    }

    #[test]
    fn test_scalar_columns() {
        let m = TypeMapper::default();
        let c = m.column(&col(SqlType::BigInt, false, false));
        assert_eq!(c.value, "i64");
        assert_eq!(c.field, "i64");
        assert_eq!(c.kind, "Ordinal");
        assert_eq!(c.nullability, "NotNull");
        assert!(c.copy);

        let c = m.column(&col(SqlType::Text, true, false));
        assert_eq!(c.value, "String");
        assert_eq!(c.field, "Option<String>");
        assert_eq!(c.kind, "Text");
        assert_eq!(c.nullability, "Nullable");
        assert!(!c.copy);
    }

    #[test]
    fn test_arrays_and_documents_are_opaque() {
        let m = TypeMapper::default();
        let c = m.column(&col(SqlType::Integer, false, true));
        assert_eq!(c.value, "Vec<i32>");
        assert_eq!(c.kind, "Opaque");
        assert!(!c.copy);

        let c = m.column(&col(SqlType::Jsonb, true, false));
        assert_eq!(c.field, "Option<pgtyped::serde_json::Value>");
        assert_eq!(c.kind, "Opaque");
    }

    #[test]
    fn test_custom_mapping_overrides_builtin() {
        let mut custom = BTreeMap::new();
        custom.insert("double  precision".to_string(), "my::Money".to_string());
        let m = TypeMapper::new(custom);
        assert_eq!(m.map(SqlType::DoublePrecision), "my::Money");
        let c = m.column(&col(SqlType::DoublePrecision, false, true));
        assert_eq!(c.value, "Vec<my::Money>");
        assert_eq!(c.kind, "Opaque");
        assert!(!m.column(&col(SqlType::DoublePrecision, false, false)).copy);
    }
}
