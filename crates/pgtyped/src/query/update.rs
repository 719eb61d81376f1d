//! UPDATE builder.

use super::Statement;
use super::base::{Base, terminate};
use crate::clause::Clause;
use crate::column::Field;
use crate::error::{OrmError, OrmResult};
use crate::render::{RenderCtx, RenderMode};
use crate::setter::ValueSetter;

/// `UPDATE table SET a = .., b = .. [WHERE ..] [RETURNING ..]`
pub struct UpdateQuery<T> {
    base: Base<T>,
    setters: Vec<ValueSetter<T>>,
    where_clauses: Vec<Clause<T>>,
}

impl<T> UpdateQuery<T> {
    pub(crate) fn new(base: Base<T>) -> Self {
        Self {
            base,
            setters: Vec::new(),
            where_clauses: Vec::new(),
        }
    }

    pub fn set(mut self, setter: ValueSetter<T>) -> Self {
        self.setters.push(setter);
        self
    }

    pub fn set_all(mut self, setters: impl IntoIterator<Item = ValueSetter<T>>) -> Self {
        self.setters.extend(setters);
        self
    }

    pub fn filter(mut self, clause: Clause<T>) -> Self {
        self.where_clauses.push(clause);
        self
    }

    pub fn filter_all(mut self, clauses: impl IntoIterator<Item = Clause<T>>) -> Self {
        self.where_clauses.extend(clauses);
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
}

impl<T> Statement for UpdateQuery<T> {
    fn table_alias(&self) -> &str {
        &self.base.alias
    }

    fn render(&self, ctx: &mut RenderCtx<'_>, mode: RenderMode) {
        ctx.push_sql("UPDATE ");
        ctx.push_sql(&self.base.table);
        ctx.push_sql(" SET ");
        for (i, setter) in self.setters.iter().enumerate() {
            if i > 0 {
                ctx.push_sql(", ");
            }
            setter.render(ctx);
        }
        self.base.render_where(ctx, &self.where_clauses);
        self.base.render_returning(ctx);
        terminate(ctx, mode);
    }

    fn scan_fields(&self) -> Vec<&str> {
        self.base.scan_fields()
    }

    fn validate(&self) -> OrmResult<()> {
        if self.setters.is_empty() {
            return Err(OrmError::empty_fields(format!(
                "update {} has no assignments",
                self.base.table
            )));
        }
        Ok(())
    }

    fn size_hint(&self) -> usize {
        128 + (self.setters.len() + self.where_clauses.len()) * 32
    }
}

impl<T> Clone for UpdateQuery<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            setters: self.setters.clone(),
            where_clauses: self.where_clauses.clone(),
        }
    }
}

impl<T> std::fmt::Debug for UpdateQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateQuery")
            .field("table", &self.base.table)
            .field("setters", &self.setters)
            .field("where", &self.where_clauses)
            .finish_non_exhaustive()
    }
}
