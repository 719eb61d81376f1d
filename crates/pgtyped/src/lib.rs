//! # pgtyped
//!
//! Typed SQL builders for PostgreSQL tables described by `pgtyped` schema files.
//!
//! ## Features
//!
//! - **Typed columns**: each column carries its value type, a value kind and a
//!   nullability marker; operators the column's SQL type does not support do not compile
//! - **Composable clauses**: comparisons, `AND`/`OR`/`NOT`, `EXISTS`, raw fragments and
//!   sub-queries form one tree rendered in a single pass
//! - **Positional parameters**: `build()` returns SQL with `$1, $2, ..` and the matching
//!   argument list, ready for `tokio-postgres`
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//! - **Bulk load**: binary `COPY` for record slices
//!
//! ## Example
//!
//! ```
//! use pgtyped::prelude::*;
//!
//! #[derive(Debug, Clone, Copy)]
//! struct Users;
//!
//! let table = TableDef::<Users>::new(
//!     "users",
//!     vec![
//!         ColumnDescriptor::new("id", SqlType::BigInt),
//!         ColumnDescriptor::new("email", SqlType::Text),
//!         ColumnDescriptor::new("age", SqlType::Integer).nullable(),
//!     ],
//! );
//! let id: Column<Users, i64, Ordinal> = Column::new("id");
//! let email: Column<Users, String, Text> = Column::new("email");
//! let age: Column<Users, i32, Ordinal, Nullable> = Column::new("age");
//!
//! let (sql, args) = table
//!     .select([id.field(), email.field()])
//!     .filter(age.gte(18))
//!     .filter(email.ilike("example.com"))
//!     .order_by_desc([id.field()])
//!     .limit(20)
//!     .build();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT users.id, users.email FROM users AS users \
//!      WHERE users.age >= $1 AND users.email ILIKE '%' || $2::text || '%' \
//!      ORDER BY users.id DESC LIMIT 20;"
//! );
//! assert_eq!(args.len(), 2);
//! ```

pub mod clause;
pub mod client;
pub mod column;
pub mod error;
pub mod monitor;
pub mod operator;
pub mod param;
pub mod query;
pub mod record;
pub mod render;
pub mod repo;
pub mod schema;
pub mod setter;
pub mod table;

pub mod prelude;

pub use clause::Clause;
pub use client::GenericClient;
pub use column::{
    AsField, Column, ColumnAlias, Field, NotNull, Nullability, Nullable, Opaque, Ordered, Ordinal,
    TableTag, Text, Textual, ValueKind, marker_capabilities,
};
pub use error::{OrmError, OrmResult};
pub use monitor::QueryType;
pub use operator::{ColumnExpr, CommonOperator, LikeOperator, NullOperator, ScalarOperator};
pub use param::{Param, ParamList};
pub use query::{DeleteQuery, InsertQuery, SelectQuery, Statement, UpdateQuery};
pub use record::{Record, RowExt};
pub use render::{RenderCtx, RenderMode, ScratchPool};
pub use repo::{CallOptions, Repository};
pub use schema::{Capabilities, Capability, ColumnDescriptor, SqlType};
pub use setter::{SetterValue, ValueSetter};
pub use table::TableDef;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};

// Generated code names these without adding direct dependencies.
pub use chrono;
pub use serde_json;
pub use tokio_postgres;
pub use uuid;
