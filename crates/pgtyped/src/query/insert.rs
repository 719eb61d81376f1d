//! INSERT builder.

use super::Statement;
use super::base::{Base, push_names, terminate};
use crate::column::Field;
use crate::error::{OrmError, OrmResult};
use crate::param::Param;
use crate::render::{RenderCtx, RenderMode};
use crate::setter::{SetterValue, ValueSetter};

/// `INSERT INTO table [(cols)] VALUES (..)[, (..)] [ON CONFLICT ..] [RETURNING ..]`
pub struct InsertQuery<T> {
    base: Base<T>,
    columns: Vec<Field<T>>,
    rows: Vec<Vec<SetterValue>>,
    conflict: Vec<Field<T>>,
    do_nothing: bool,
    do_update: Vec<Field<T>>,
}

impl<T> InsertQuery<T> {
    pub(crate) fn new(base: Base<T>) -> Self {
        Self {
            base,
            columns: Vec::new(),
            rows: Vec::new(),
            conflict: Vec::new(),
            do_nothing: false,
            do_update: Vec::new(),
        }
    }

    /// Set the column list, replacing any earlier one.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Field<T>>) -> Self {
        self.columns = columns.into_iter().collect();
        self
    }

    /// Append one row of bound values, in column order.
    pub fn values(mut self, values: impl IntoIterator<Item = Param>) -> Self {
        self.rows
            .push(values.into_iter().map(SetterValue::Value).collect());
        self
    }

    /// Append one row given as setter values (bound, expression or raw).
    pub fn row(mut self, values: impl IntoIterator<Item = SetterValue>) -> Self {
        self.rows.push(values.into_iter().collect());
        self
    }

    /// Take columns and a single row of values from `setters`, replacing any
    /// columns and rows set before.
    ///
    /// Expression setters carry no bound value and are skipped.
    pub fn from(mut self, setters: impl IntoIterator<Item = ValueSetter<T>>) -> Self {
        let mut columns = Vec::new();
        let mut row = Vec::new();
        for setter in setters {
            if setter.is_expr() {
                continue;
            }
            let (column, value) = setter.into_parts();
            columns.push(column);
            row.push(value);
        }
        self.columns = columns;
        self.rows = vec![row];
        self
    }

    /// Set the `ON CONFLICT (..)` target.
    pub fn on_conflict(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.conflict.extend(fields);
        self
    }

    /// `ON CONFLICT .. DO NOTHING`; clears any `DO UPDATE` list.
    pub fn do_nothing(mut self) -> Self {
        self.do_nothing = true;
        self.do_update.clear();
        self
    }

    /// `ON CONFLICT .. DO UPDATE SET col=EXCLUDED.col` for each field; clears `DO NOTHING`.
    pub fn do_update(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.do_update.extend(fields);
        self.do_nothing = false;
        self
    }

    pub fn returning(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.base.using = fields.into_iter().collect();
        self
    }

    pub fn returning_all(mut self) -> Self {
        self.base.using = self.base.all.to_vec();
        self
    }

    fn render_conflict(&self, ctx: &mut RenderCtx<'_>) {
        if !self.do_nothing && self.do_update.is_empty() {
            return;
        }
        ctx.push_sql(" ON CONFLICT");
        if !self.conflict.is_empty() {
            ctx.push_sql(" (");
            push_names(ctx, &self.conflict);
            ctx.push_char(')');
        }
        if self.do_nothing {
            ctx.push_sql(" DO NOTHING");
            return;
        }
        ctx.push_sql(" DO UPDATE SET ");
        for (i, f) in self.do_update.iter().enumerate() {
            if i > 0 {
                ctx.push_sql(", ");
            }
            ctx.push_sql(f.name());
            ctx.push_sql("=EXCLUDED.");
            ctx.push_sql(f.name());
        }
    }
}

impl<T> Statement for InsertQuery<T> {
    fn table_alias(&self) -> &str {
        &self.base.alias
    }

    fn render(&self, ctx: &mut RenderCtx<'_>, mode: RenderMode) {
        ctx.push_sql("INSERT INTO ");
        ctx.push_sql(&self.base.table);

        if !self.columns.is_empty() {
            ctx.push_sql(" (");
            push_names(ctx, &self.columns);
            ctx.push_char(')');
        }

        let rows: Vec<&Vec<SetterValue>> = self.rows.iter().filter(|r| !r.is_empty()).collect();
        if rows.is_empty() {
            ctx.push_sql(" DEFAULT VALUES");
        } else {
            ctx.push_sql(" VALUES ");
            for (i, row) in rows.into_iter().enumerate() {
                if i > 0 {
                    ctx.push_sql(", ");
                }
                ctx.push_char('(');
                for (j, value) in row.iter().enumerate() {
                    if j > 0 {
                        ctx.push_sql(", ");
                    }
                    value.render(ctx);
                }
                ctx.push_char(')');
            }
        }

        self.render_conflict(ctx);
        self.base.render_returning(ctx);
        terminate(ctx, mode);
    }

    fn scan_fields(&self) -> Vec<&str> {
        self.base.scan_fields()
    }

    fn validate(&self) -> OrmResult<()> {
        if !self.do_update.is_empty() && self.conflict.is_empty() {
            return Err(OrmError::empty_fields("conflict target"));
        }
        let width = self.columns.len();
        if width > 0 {
            if self.rows.iter().all(Vec::is_empty) {
                return Err(OrmError::empty_fields(format!(
                    "insert into {}: columns without values",
                    self.base.table
                )));
            }
            if let Some(row) = self.rows.iter().find(|r| !r.is_empty() && r.len() != width) {
                return Err(OrmError::Other(format!(
                    "insert into {}: {} columns but a row has {} values",
                    self.base.table,
                    width,
                    row.len()
                )));
            }
        }
        Ok(())
    }

    fn size_hint(&self) -> usize {
        128 + self.columns.len() * 16
    }
}

impl<T> Clone for InsertQuery<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            conflict: self.conflict.clone(),
            do_nothing: self.do_nothing,
            do_update: self.do_update.clone(),
        }
    }
}

impl<T> std::fmt::Debug for InsertQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertQuery")
            .field("table", &self.base.table)
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("conflict", &self.conflict)
            .field("do_nothing", &self.do_nothing)
            .field("do_update", &self.do_update)
            .finish_non_exhaustive()
    }
}
