//! Column assignments for INSERT and UPDATE.

use crate::column::Field;
use crate::param::Param;
use crate::render::RenderCtx;
use std::borrow::Cow;

/// Right-hand side of one assignment.
#[derive(Debug, Clone)]
pub enum SetterValue {
    /// Bound to the next placeholder.
    Value(Param),
    /// SQL expression written verbatim, e.g. `now()` or `counter + 1`.
    Expr(Cow<'static, str>),
    /// Raw SQL whose `?` markers become placeholders bound to `args`.
    Raw {
        sql: Cow<'static, str>,
        args: Vec<Param>,
    },
}

impl SetterValue {
    pub(crate) fn render(&self, ctx: &mut RenderCtx<'_>) {
        match self {
            SetterValue::Value(param) => {
                ctx.bind(param.clone());
            }
            SetterValue::Expr(expr) => ctx.push_sql(expr),
            SetterValue::Raw { sql, args } => {
                ctx.push_raw(sql, args);
            }
        }
    }
}

/// One `column = value` assignment for table `T`.
pub struct ValueSetter<T> {
    column: Field<T>,
    value: SetterValue,
}

impl<T> ValueSetter<T> {
    pub fn new(column: Field<T>, value: SetterValue) -> Self {
        Self { column, value }
    }

    pub fn value(column: Field<T>, param: Param) -> Self {
        Self::new(column, SetterValue::Value(param))
    }

    pub fn expr(column: Field<T>, expr: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, SetterValue::Expr(expr.into()))
    }

    pub fn raw(column: Field<T>, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Self {
        Self::new(
            column,
            SetterValue::Raw {
                sql: sql.into(),
                args,
            },
        )
    }

    pub fn column(&self) -> &Field<T> {
        &self.column
    }

    pub fn setter_value(&self) -> &SetterValue {
        &self.value
    }

    /// Whether the assignment is a verbatim SQL expression with no bound value.
    pub fn is_expr(&self) -> bool {
        matches!(self.value, SetterValue::Expr(_))
    }

    pub(crate) fn into_parts(self) -> (Field<T>, SetterValue) {
        (self.column, self.value)
    }

    /// `column = <value>`; the column is unqualified as SET requires.
    pub(crate) fn render(&self, ctx: &mut RenderCtx<'_>) {
        ctx.push_sql(self.column.name());
        ctx.push_sql(" = ");
        self.value.render(ctx);
    }
}

impl<T> Clone for ValueSetter<T> {
    fn clone(&self) -> Self {
        Self {
            column: self.column.clone(),
            value: self.value.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ValueSetter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueSetter")
            .field("column", &self.column.name())
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnAlias;
    use crate::param::ParamList;
    use crate::params;

    #[derive(Debug, Clone, Copy)]
    struct T;

    fn render(s: &ValueSetter<T>) -> (String, usize) {
        let mut sql = String::new();
        let mut args = ParamList::new();
        let mut ctx = RenderCtx::new(&mut sql, &mut args);
        s.render(&mut ctx);
        (sql, args.len())
    }

    fn col(name: &str) -> Field<T> {
        Field::new(ColumnAlias::new(name))
    }

    #[test]
    fn test_value_setter_binds() {
        let s = ValueSetter::value(col("name"), Param::new("bob"));
        assert_eq!(render(&s), ("name = $1".to_string(), 1));
    }

    #[test]
    fn test_expr_setter_is_verbatim() {
        let s = ValueSetter::expr(col("updated_at"), "now()");
        assert!(s.is_expr());
        assert_eq!(render(&s), ("updated_at = now()".to_string(), 0));
    }

    #[test]
    fn test_raw_setter_numbers_markers() {
        let s = ValueSetter::raw(col("score"), "score + ?", params![10_i32]);
        assert_eq!(render(&s), ("score = score + $1".to_string(), 1));
    }
}
