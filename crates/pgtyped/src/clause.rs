//! Clause algebra: the renderable nodes of a `WHERE` expression tree.

use crate::column::Field;
use crate::param::{Param, ParamList};
use crate::query::Statement;
use crate::render::{RenderCtx, RenderMode};
use std::borrow::Cow;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A node of a boolean/comparison expression over table `T`.
///
/// Clauses never store a table alias. The alias is supplied when rendering, so
/// the same tree can be reused under a different alias (self-joins, sub-queries).
/// Composite nodes parenthesize their own output.
pub enum Clause<T> {
    /// One bound value; `like` wraps it as `'%' || $n::text || '%'`.
    Param { value: Param, like: bool },
    /// A whole list bound to a single placeholder, rendered `($n)`.
    Slice(Param),
    /// Raw SQL where each `?` becomes the next placeholder.
    Raw {
        sql: Cow<'static, str>,
        args: Vec<Param>,
    },
    /// A nested statement rendered in parentheses within the same pass.
    SubQuery(Arc<dyn Statement>),
    /// `alias.column op right`, wrapped in `NOT (..)` when `negate` is set.
    Field {
        column: Field<T>,
        op: Cow<'static, str>,
        right: Box<Clause<T>>,
        negate: bool,
    },
    And(Vec<Clause<T>>),
    Or(Vec<Clause<T>>),
    Not(Box<Clause<T>>),
    /// `[NOT] EXISTS (..)`
    Exists { inner: Box<Clause<T>>, negate: bool },
}

impl<T> Clause<T> {
    pub fn param<V: ToSql + Send + Sync + 'static>(value: V) -> Self {
        Clause::Param {
            value: Param::new(value),
            like: false,
        }
    }

    /// A pattern bound with leading and trailing `%` wildcards.
    pub fn like_param<V: ToSql + Send + Sync + 'static>(value: V) -> Self {
        Clause::Param {
            value: Param::new(value),
            like: true,
        }
    }

    pub fn slice<V: ToSql + Send + Sync + 'static>(values: Vec<V>) -> Self {
        Clause::Slice(Param::list(values))
    }

    pub fn raw(sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Self {
        Clause::Raw {
            sql: sql.into(),
            args,
        }
    }

    /// Embed `stmt`; its placeholders continue the outer numbering.
    pub fn sub_query(stmt: impl Statement + 'static) -> Self {
        Clause::SubQuery(Arc::new(stmt))
    }

    pub fn field(column: Field<T>, op: impl Into<Cow<'static, str>>, right: Clause<T>) -> Self {
        Clause::Field {
            column,
            op: op.into(),
            right: Box::new(right),
            negate: false,
        }
    }

    pub fn and(clauses: Vec<Clause<T>>) -> Self {
        Clause::And(clauses)
    }

    pub fn or(clauses: Vec<Clause<T>>) -> Self {
        Clause::Or(clauses)
    }

    pub fn not(inner: Clause<T>) -> Self {
        Clause::Not(Box::new(inner))
    }

    pub fn exists(inner: Clause<T>) -> Self {
        Clause::Exists {
            inner: Box::new(inner),
            negate: false,
        }
    }

    pub fn not_exists(inner: Clause<T>) -> Self {
        Clause::Exists {
            inner: Box::new(inner),
            negate: true,
        }
    }

    /// Negate a field comparison or an `EXISTS`; any other node is wrapped in `NOT (..)`.
    pub fn negated(self) -> Self {
        match self {
            Clause::Field {
                column,
                op,
                right,
                negate,
            } => Clause::Field {
                column,
                op,
                right,
                negate: !negate,
            },
            Clause::Exists { inner, negate } => Clause::Exists {
                inner,
                negate: !negate,
            },
            other => Clause::not(other),
        }
    }

    fn is_empty_raw(&self) -> bool {
        matches!(self, Clause::Raw { sql, args } if sql.is_empty() && args.is_empty())
    }

    /// Render into `ctx`, qualifying columns with `alias`.
    ///
    /// # Panics
    ///
    /// Panics when a [`Clause::Slice`] carries a scalar; that is a defect in the
    /// caller, not a runtime condition.
    pub fn render(&self, ctx: &mut RenderCtx<'_>, alias: &str) {
        match self {
            Clause::Param { value, like } => {
                if *like {
                    ctx.push_sql("'%' || ");
                }
                ctx.bind(value.clone());
                if *like {
                    ctx.push_sql("::text || '%'");
                }
            }
            Clause::Slice(value) => {
                assert!(
                    value.is_list(),
                    "type mismatch: slice clause expects a list value, got {value:?}"
                );
                ctx.push_char('(');
                ctx.bind(value.clone());
                ctx.push_char(')');
            }
            Clause::Raw { sql, args } => {
                ctx.push_raw(sql, args);
            }
            Clause::SubQuery(stmt) => {
                ctx.push_char('(');
                stmt.render(ctx, RenderMode::Embedded);
                ctx.push_char(')');
            }
            Clause::Field {
                column,
                op,
                right,
                negate,
            } => {
                if *negate {
                    ctx.push_sql("NOT (");
                }
                column.render_qualified(ctx, alias);
                ctx.push_char(' ');
                ctx.push_sql(op);
                if !right.is_empty_raw() {
                    ctx.push_char(' ');
                    right.render(ctx, alias);
                }
                if *negate {
                    ctx.push_char(')');
                }
            }
            Clause::And(clauses) => render_joined(ctx, alias, clauses, " AND ", "TRUE"),
            Clause::Or(clauses) => render_joined(ctx, alias, clauses, " OR ", "FALSE"),
            Clause::Not(inner) => {
                ctx.push_sql("NOT (");
                inner.render(ctx, alias);
                ctx.push_char(')');
            }
            Clause::Exists { inner, negate } => {
                if *negate {
                    ctx.push_sql("NOT ");
                }
                ctx.push_sql("EXISTS ");
                if matches!(**inner, Clause::SubQuery(_)) {
                    inner.render(ctx, alias);
                } else {
                    ctx.push_char('(');
                    inner.render(ctx, alias);
                    ctx.push_char(')');
                }
            }
        }
    }

    /// Render this clause on its own, numbering placeholders from `$1`.
    pub fn to_sql(&self, alias: &str) -> (String, ParamList) {
        let mut sql = String::new();
        let mut args = ParamList::new();
        let mut ctx = RenderCtx::new(&mut sql, &mut args);
        self.render(&mut ctx, alias);
        (sql, args)
    }
}

fn render_joined<T>(
    ctx: &mut RenderCtx<'_>,
    alias: &str,
    clauses: &[Clause<T>],
    sep: &str,
    identity: &str,
) {
    ctx.push_char('(');
    if clauses.is_empty() {
        ctx.push_sql(identity);
    }
    for (i, clause) in clauses.iter().enumerate() {
        if i > 0 {
            ctx.push_sql(sep);
        }
        clause.render(ctx, alias);
    }
    ctx.push_char(')');
}

impl<T> Clone for Clause<T> {
    fn clone(&self) -> Self {
        match self {
            Clause::Param { value, like } => Clause::Param {
                value: value.clone(),
                like: *like,
            },
            Clause::Slice(value) => Clause::Slice(value.clone()),
            Clause::Raw { sql, args } => Clause::Raw {
                sql: sql.clone(),
                args: args.clone(),
            },
            Clause::SubQuery(stmt) => Clause::SubQuery(Arc::clone(stmt)),
            Clause::Field {
                column,
                op,
                right,
                negate,
            } => Clause::Field {
                column: column.clone(),
                op: op.clone(),
                right: right.clone(),
                negate: *negate,
            },
            Clause::And(clauses) => Clause::And(clauses.clone()),
            Clause::Or(clauses) => Clause::Or(clauses.clone()),
            Clause::Not(inner) => Clause::Not(inner.clone()),
            Clause::Exists { inner, negate } => Clause::Exists {
                inner: inner.clone(),
                negate: *negate,
            },
        }
    }
}

impl<T> std::fmt::Debug for Clause<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Clause::Param { value, like } => f
                .debug_struct("Param")
                .field("value", value)
                .field("like", like)
                .finish(),
            Clause::Slice(value) => f.debug_tuple("Slice").field(value).finish(),
            Clause::Raw { sql, args } => f
                .debug_struct("Raw")
                .field("sql", sql)
                .field("args", &args.len())
                .finish(),
            Clause::SubQuery(stmt) => f.debug_tuple("SubQuery").field(stmt).finish(),
            Clause::Field {
                column,
                op,
                right,
                negate,
            } => f
                .debug_struct("Field")
                .field("column", &column.name())
                .field("op", op)
                .field("right", right)
                .field("negate", negate)
                .finish(),
            Clause::And(clauses) => f.debug_tuple("And").field(clauses).finish(),
            Clause::Or(clauses) => f.debug_tuple("Or").field(clauses).finish(),
            Clause::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
            Clause::Exists { inner, negate } => f
                .debug_struct("Exists")
                .field("inner", inner)
                .field("negate", negate)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnAlias;
    use crate::params;

    #[derive(Debug, Clone, Copy)]
    struct T;

    fn col(name: &str) -> Field<T> {
        Field::new(ColumnAlias::new(name))
    }

    #[test]
    fn test_field_eq_param() {
        let c = Clause::field(col("id"), "=", Clause::param(7_i64));
        let (sql, args) = c.to_sql("users");
        assert_eq!(sql, "users.id = $1");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_field_in_slice_binds_one_placeholder() {
        let c = Clause::field(col("id"), "IN", Clause::slice(vec![1_i32, 2, 3]));
        let (sql, args) = c.to_sql("users");
        assert_eq!(sql, "users.id IN ($1)");
        assert_eq!(args.len(), 1);
        assert!(args.iter().next().unwrap().is_list());
    }

    #[test]
    fn test_negated_like() {
        let c = Clause::field(col("name"), "LIKE", Clause::param("x")).negated();
        let (sql, _) = c.to_sql("users");
        assert_eq!(sql, "NOT (users.name LIKE $1)");
    }

    #[test]
    fn test_like_wrapping() {
        let c = Clause::field(col("name"), "ILIKE", Clause::like_param("ali"));
        let (sql, _) = c.to_sql("u");
        assert_eq!(sql, "u.name ILIKE '%' || $1::text || '%'");
    }

    #[test]
    fn test_nested_and_or_numbering() {
        let c = Clause::and(vec![
            Clause::field(col("a"), ">", Clause::param(18_i32)),
            Clause::or(vec![
                Clause::field(col("b"), "=", Clause::param("x")),
                Clause::field(col("b"), "=", Clause::param("y")),
            ]),
        ]);
        let (sql, args) = c.to_sql("t");
        assert_eq!(sql, "(t.a > $1 AND (t.b = $2 OR t.b = $3))");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_raw_substitution() {
        let c: Clause<T> = Clause::raw("a = ? AND b BETWEEN ? AND ?", params![1, 2, 3]);
        let (sql, args) = c.to_sql("t");
        assert_eq!(sql, "a = $1 AND b BETWEEN $2 AND $3");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_null_test_has_no_trailing_space() {
        let c = Clause::field(col("deleted_at"), "IS NULL", Clause::raw("", vec![]));
        assert_eq!(c.to_sql("t").0, "t.deleted_at IS NULL");
    }

    #[test]
    fn test_not_and_exists_raw() {
        let inner = Clause::field(col("id"), "=", Clause::param(1_i32));
        assert_eq!(Clause::not(inner).to_sql("t").0, "NOT (t.id = $1)");

        let e: Clause<T> = Clause::not_exists(Clause::raw("SELECT 1 FROM bans WHERE uid = ?", params![5]));
        assert_eq!(e.to_sql("t").0, "NOT EXISTS (SELECT 1 FROM bans WHERE uid = $1)");
    }

    #[test]
    fn test_empty_combinators_render_identity() {
        assert_eq!(Clause::<T>::and(vec![]).to_sql("t").0, "(TRUE)");
        assert_eq!(Clause::<T>::or(vec![]).to_sql("t").0, "(FALSE)");
    }

    #[test]
    fn test_render_is_deterministic() {
        let c = Clause::and(vec![
            Clause::field(col("a"), "=", Clause::param(1_i32)),
            Clause::field(col("b"), "IN", Clause::slice(vec!["x", "y"])),
        ]);
        assert_eq!(c.to_sql("t").0, c.to_sql("t").0);
        assert_eq!(c.clone().to_sql("t").0, "(t.a = $1 AND t.b IN ($2))");
    }

    #[test]
    fn test_alias_is_late_bound() {
        let c = Clause::field(col("id"), "=", Clause::param(1_i32));
        assert_eq!(c.to_sql("a").0, "a.id = $1");
        assert_eq!(c.to_sql("b").0, "b.id = $1");
    }

    #[test]
    #[should_panic(expected = "type mismatch")]
    fn test_slice_with_scalar_panics() {
        let c = Clause::field(col("id"), "IN", Clause::Slice(Param::new(1_i32)));
        let _ = c.to_sql("t");
    }
}
