//! Column descriptors and SQL type classification.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio_postgres::types::Type;

/// Declared SQL type of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SqlType {
    Text,
    Char,
    Integer,
    #[serde(rename = "BIGINT")]
    BigInt,
    #[serde(rename = "SMALLINT")]
    SmallInt,
    DoublePrecision,
    Real,
    Boolean,
    Timestamptz,
    Jsonb,
    Hstore,
    Uuid,
}

impl SqlType {
    /// Keyword used in DDL.
    pub fn sql_name(self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Char => "CHAR",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::DoublePrecision => "DOUBLE PRECISION",
            SqlType::Real => "REAL",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Timestamptz => "TIMESTAMPTZ",
            SqlType::Jsonb => "JSONB",
            SqlType::Hstore => "HSTORE",
            SqlType::Uuid => "UUID",
        }
    }

    /// Ordered, directly comparable types.
    pub fn is_scalar(self) -> bool {
        !matches!(self, SqlType::Jsonb | SqlType::Hstore)
    }

    pub fn is_text_like(self) -> bool {
        matches!(self, SqlType::Text | SqlType::Char)
    }

    /// Wire type used for binary COPY.
    ///
    /// `HSTORE` is an extension type without a fixed OID and has no mapping.
    pub fn pg_type(self, array: bool) -> Option<Type> {
        let ty = match (self, array) {
            (SqlType::Text, false) => Type::TEXT,
            (SqlType::Text, true) => Type::TEXT_ARRAY,
            (SqlType::Char, false) => Type::BPCHAR,
            (SqlType::Char, true) => Type::BPCHAR_ARRAY,
            (SqlType::Integer, false) => Type::INT4,
            (SqlType::Integer, true) => Type::INT4_ARRAY,
            (SqlType::BigInt, false) => Type::INT8,
            (SqlType::BigInt, true) => Type::INT8_ARRAY,
            (SqlType::SmallInt, false) => Type::INT2,
            (SqlType::SmallInt, true) => Type::INT2_ARRAY,
            (SqlType::DoublePrecision, false) => Type::FLOAT8,
            (SqlType::DoublePrecision, true) => Type::FLOAT8_ARRAY,
            (SqlType::Real, false) => Type::FLOAT4,
            (SqlType::Real, true) => Type::FLOAT4_ARRAY,
            (SqlType::Boolean, false) => Type::BOOL,
            (SqlType::Boolean, true) => Type::BOOL_ARRAY,
            (SqlType::Timestamptz, false) => Type::TIMESTAMPTZ,
            (SqlType::Timestamptz, true) => Type::TIMESTAMPTZ_ARRAY,
            (SqlType::Jsonb, false) => Type::JSONB,
            (SqlType::Jsonb, true) => Type::JSONB_ARRAY,
            (SqlType::Uuid, false) => Type::UUID,
            (SqlType::Uuid, true) => Type::UUID_ARRAY,
            (SqlType::Hstore, _) => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

/// A named bundle of column operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Equality, sub-query and raw comparisons, logical combinators, setters, count.
    Common,
    /// Ordering, `BETWEEN`, `IN`, `ANY`/`ALL`.
    Scalar,
    /// `LIKE`/`ILIKE` with wildcard wrapping.
    Like,
    /// `IS NULL`/`IS NOT NULL`.
    NullTest,
}

impl Capability {
    /// Name of the operator trait that carries this group.
    pub fn trait_name(self) -> &'static str {
        match self {
            Capability::Common => "CommonOperator",
            Capability::Scalar => "ScalarOperator",
            Capability::Like => "LikeOperator",
            Capability::NullTest => "NullOperator",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Capability::Common => 1,
            Capability::Scalar => 1 << 1,
            Capability::Like => 1 << 2,
            Capability::NullTest => 1 << 3,
        }
    }
}

/// Set of capability groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn with(mut self, cap: Capability) -> Self {
        self.0 |= cap.bit();
        self
    }

    pub const fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    pub fn is_superset_of(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }

    /// Groups in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Capability> {
        [
            Capability::Common,
            Capability::Scalar,
            Capability::Like,
            Capability::NullTest,
        ]
        .into_iter()
        .filter(move |c| self.contains(*c))
    }
}

/// One column of a table as seen by the query engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
    pub array: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: false,
            array: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.array = true;
        self
    }

    /// Operator groups this column supports.
    ///
    /// Array columns only get the common group: ordering and pattern matching
    /// apply to element types, not to whole arrays.
    pub fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::empty().with(Capability::Common);
        if !self.array && self.sql_type.is_scalar() {
            caps = caps.with(Capability::Scalar);
        }
        if !self.array && self.sql_type.is_text_like() {
            caps = caps.with(Capability::Like);
        }
        if self.nullable {
            caps = caps.with(Capability::NullTest);
        }
        caps
    }

    pub fn pg_type(&self) -> Option<Type> {
        self.sql_type.pg_type(self.array)
    }
}
