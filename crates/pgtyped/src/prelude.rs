//! Convenient imports for typical `pgtyped` usage.
//!
//! Generated table modules start with:
//!
//! ```ignore
//! use pgtyped::prelude::*;
//! ```

pub use crate::{
    AsField, CallOptions, Clause, Column, ColumnDescriptor, ColumnExpr, CommonOperator,
    DeleteQuery, Field, GenericClient, InsertQuery, LikeOperator, NotNull, NullOperator, Nullable,
    Opaque, Ordinal, OrmError, OrmResult, Param, Record, Repository, RowExt, ScalarOperator,
    SelectQuery, SqlType, Statement, TableDef, Text, UpdateQuery, ValueSetter, params,
};

#[cfg(feature = "pool")]
pub use crate::{create_pool, create_pool_with_config};
