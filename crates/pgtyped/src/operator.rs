//! Operator surfaces of typed columns.
//!
//! Each capability group is a trait with provided methods. The blanket impls at
//! the bottom of this module decide which [`Column`] marker combinations get
//! which group:
//!
//! | trait              | implemented for                 |
//! |--------------------|---------------------------------|
//! | [`CommonOperator`] | every column                    |
//! | [`ScalarOperator`] | kind `Ordinal` or `Text`        |
//! | [`LikeOperator`]   | kind `Text`                     |
//! | [`NullOperator`]   | nullability `Nullable`          |
//!
//! Calling an operator outside a column's groups does not compile:
//!
//! ```compile_fail
//! use pgtyped::prelude::*;
//!
//! #[derive(Debug, Clone, Copy)]
//! struct Docs;
//!
//! let payload: Column<Docs, serde_json::Value, Opaque> = Column::new("payload");
//! let _ = payload.gt(serde_json::json!({}));
//! ```
//!
//! ```compile_fail
//! use pgtyped::prelude::*;
//!
//! #[derive(Debug, Clone, Copy)]
//! struct Users;
//!
//! let age: Column<Users, i32, Ordinal> = Column::new("age");
//! let _ = age.like("4");
//! ```
//!
//! ```compile_fail
//! use pgtyped::prelude::*;
//!
//! #[derive(Debug, Clone, Copy)]
//! struct Users;
//!
//! let id: Column<Users, i64, Ordinal, NotNull> = Column::new("id");
//! let _ = id.is_null();
//! ```
//!
//! ```
//! use pgtyped::prelude::*;
//!
//! #[derive(Debug, Clone, Copy)]
//! struct Users;
//!
//! let email: Column<Users, String, Text, Nullable> = Column::new("email");
//! let (sql, args) = Clause::or(vec![email.is_null(), email.ilike("@example.com")]).to_sql("u");
//! assert_eq!(sql, "(u.email IS NULL OR u.email ILIKE '%' || $1::text || '%')");
//! assert_eq!(args.len(), 1);
//! ```

use crate::clause::Clause;
use crate::column::{Column, ColumnAlias, Field, Nullability, Nullable, Ordered, Textual, ValueKind};
use crate::param::Param;
use crate::query::Statement;
use crate::setter::ValueSetter;
use std::borrow::Cow;
use tokio_postgres::types::ToSql;

/// A column usable on the left-hand side of an operator.
pub trait ColumnExpr {
    type Table;
    /// Type compared against in conditions.
    type Value: ToSql + Send + Sync + 'static;
    /// Type written by setters: the value type, or `Option` of it when nullable.
    type Stored: ToSql + Send + Sync + 'static;

    fn column_alias(&self) -> &ColumnAlias;

    fn lhs(&self) -> Field<Self::Table> {
        Field::new(self.column_alias().clone())
    }
}

/// Operators available on every column.
pub trait CommonOperator: ColumnExpr {
    /// Project as `COUNT(column)`.
    ///
    /// The result column keeps the bare column name in `scan_fields`, so a
    /// record decoding it expects that field to hold an `i64`. Scan counts into
    /// a dedicated row type unless the column itself is `BIGINT`.
    fn count(&self) -> Field<Self::Table> {
        Field::new(self.column_alias().counted())
    }

    fn set(&self, value: impl Into<Self::Stored>) -> ValueSetter<Self::Table> {
        ValueSetter::value(self.lhs(), Param::new(value.into()))
    }

    /// Assign a verbatim SQL expression, e.g. `now()`.
    fn set_expr(&self, expr: impl Into<Cow<'static, str>>) -> ValueSetter<Self::Table> {
        ValueSetter::expr(self.lhs(), expr)
    }

    /// Assign raw SQL with `value` bound to its `?` marker.
    fn set_raw(
        &self,
        sql: impl Into<Cow<'static, str>>,
        value: impl Into<Self::Stored>,
    ) -> ValueSetter<Self::Table> {
        ValueSetter::raw(self.lhs(), sql, vec![Param::new(value.into())])
    }

    fn eq(&self, value: impl Into<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "=", Clause::param(value.into()))
    }

    fn neq(&self, value: impl Into<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "!=", Clause::param(value.into()))
    }

    fn eq_of(&self, query: impl Statement + 'static) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "=", Clause::sub_query(query))
    }

    fn eq_raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "=", Clause::raw(sql, args))
    }

    fn or(&self, clauses: Vec<Clause<Self::Table>>) -> Clause<Self::Table> {
        Clause::or(clauses)
    }

    fn and(&self, clauses: Vec<Clause<Self::Table>>) -> Clause<Self::Table> {
        Clause::and(clauses)
    }

    fn not(&self, clause: Clause<Self::Table>) -> Clause<Self::Table> {
        Clause::not(clause)
    }

    fn of(&self, query: impl Statement + 'static) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "=", Clause::sub_query(query))
    }

    fn not_of(&self, query: impl Statement + 'static) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "!=", Clause::sub_query(query))
    }

    /// `column <op> <raw sql>`
    fn raw(
        &self,
        op: impl Into<Cow<'static, str>>,
        sql: impl Into<Cow<'static, str>>,
        args: Vec<Param>,
    ) -> Clause<Self::Table> {
        Clause::field(self.lhs(), op, Clause::raw(sql, args))
    }

    fn not_raw(
        &self,
        op: impl Into<Cow<'static, str>>,
        sql: impl Into<Cow<'static, str>>,
        args: Vec<Param>,
    ) -> Clause<Self::Table> {
        Clause::not(self.raw(op, sql, args))
    }

    fn exists_of(&self, query: impl Statement + 'static) -> Clause<Self::Table> {
        Clause::exists(Clause::sub_query(query))
    }

    fn exists_raw(
        &self,
        sql: impl Into<Cow<'static, str>>,
        args: Vec<Param>,
    ) -> Clause<Self::Table> {
        Clause::exists(Clause::raw(sql, args))
    }
}

/// Ordering, ranges and set membership.
pub trait ScalarOperator: ColumnExpr {
    fn gt(&self, value: impl Into<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), ">", Clause::param(value.into()))
    }

    fn gte(&self, value: impl Into<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), ">=", Clause::param(value.into()))
    }

    fn lt(&self, value: impl Into<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "<", Clause::param(value.into()))
    }

    fn lte(&self, value: impl Into<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "<=", Clause::param(value.into()))
    }

    /// `(column >= lower AND column <= upper)`
    fn between(
        &self,
        lower: impl Into<Self::Value>,
        upper: impl Into<Self::Value>,
    ) -> Clause<Self::Table> {
        Clause::and(vec![self.gte(lower), self.lte(upper)])
    }

    /// `NOT ((column >= lower AND column <= upper))`
    fn not_between(
        &self,
        lower: impl Into<Self::Value>,
        upper: impl Into<Self::Value>,
    ) -> Clause<Self::Table> {
        Clause::not(self.between(lower, upper))
    }

    /// `column IN ($n)` with the whole list bound to one placeholder.
    fn in_(&self, values: Vec<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "IN", Clause::slice(values))
    }

    fn not_in(&self, values: Vec<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "IN", Clause::slice(values)).negated()
    }

    fn in_of(&self, query: impl Statement + 'static) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "IN", Clause::sub_query(query))
    }

    fn in_raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "IN", Clause::raw(sql, args))
    }

    /// `column = ANY ($n)`
    fn any(&self, values: Vec<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "= ANY", Clause::slice(values))
    }

    /// `column != ALL ($n)`
    fn not_any(&self, values: Vec<Self::Value>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "!= ALL", Clause::slice(values))
    }

    fn any_of(&self, query: impl Statement + 'static) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "= ANY", Clause::sub_query(query))
    }

    fn any_raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "= ANY", Clause::raw(sql, args))
    }
}

/// Pattern matching. Patterns are wrapped in `%` on both sides; use
/// [`LikeOperator::like_raw`] for an exact pattern.
pub trait LikeOperator: ColumnExpr {
    fn like(&self, pattern: impl Into<String>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "LIKE", Clause::like_param(pattern.into()))
    }

    fn not_like(&self, pattern: impl Into<String>) -> Clause<Self::Table> {
        self.like(pattern).negated()
    }

    fn ilike(&self, pattern: impl Into<String>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "ILIKE", Clause::like_param(pattern.into()))
    }

    fn not_ilike(&self, pattern: impl Into<String>) -> Clause<Self::Table> {
        self.ilike(pattern).negated()
    }

    fn like_raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "LIKE", Clause::raw(sql, args))
    }

    fn ilike_raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "ILIKE", Clause::raw(sql, args))
    }
}

pub trait NullOperator: ColumnExpr {
    fn is_null(&self) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "IS NULL", Clause::raw("", Vec::new()))
    }

    fn is_not_null(&self) -> Clause<Self::Table> {
        Clause::field(self.lhs(), "IS NOT NULL", Clause::raw("", Vec::new()))
    }
}

impl<T, V, K, N> ColumnExpr for Column<T, V, K, N>
where
    V: ToSql + Send + Sync + 'static,
    K: ValueKind,
    N: Nullability,
{
    type Table = T;
    type Value = V;
    type Stored = N::Stored<V>;

    fn column_alias(&self) -> &ColumnAlias {
        self.alias()
    }
}

impl<T, V, K, N> CommonOperator for Column<T, V, K, N>
where
    V: ToSql + Send + Sync + 'static,
    K: ValueKind,
    N: Nullability,
{
}

impl<T, V, K, N> ScalarOperator for Column<T, V, K, N>
where
    V: ToSql + Send + Sync + 'static,
    K: Ordered,
    N: Nullability,
{
}

impl<T, V, K, N> LikeOperator for Column<T, V, K, N>
where
    V: ToSql + Send + Sync + 'static,
    K: Textual,
    N: Nullability,
{
}

impl<T, V, K> NullOperator for Column<T, V, K, Nullable>
where
    V: ToSql + Send + Sync + 'static,
    K: ValueKind,
{
}
