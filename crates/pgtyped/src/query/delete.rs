use super::Statement;
use super::base::{Base, terminate};
use crate::clause::Clause;
use crate::column::Field;
use crate::render::{RenderCtx, RenderMode};

/// `DELETE FROM table [WHERE ..] [RETURNING ..]`
///
/// A delete without conditions removes every row; nothing guards against it.
pub struct DeleteQuery<T> {
    base: Base<T>,
    where_clauses: Vec<Clause<T>>,
}

impl<T> DeleteQuery<T> {
    pub(crate) fn new(base: Base<T>) -> Self {
        Self {
            base,
            where_clauses: Vec::new(),
        }
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

impl<T> Statement for DeleteQuery<T> {
    fn table_alias(&self) -> &str {
        &self.base.alias
    }

    fn render(&self, ctx: &mut RenderCtx<'_>, mode: RenderMode) {
        ctx.push_sql("DELETE FROM ");
        ctx.push_sql(&self.base.table);
        self.base.render_where(ctx, &self.where_clauses);
        self.base.render_returning(ctx);
        terminate(ctx, mode);
    }

    fn scan_fields(&self) -> Vec<&str> {
        self.base.scan_fields()
    }

    fn size_hint(&self) -> usize {
        128 + self.where_clauses.len() * 32
    }
}

impl<T> Clone for DeleteQuery<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            where_clauses: self.where_clauses.clone(),
        }
    }
}

impl<T> std::fmt::Debug for DeleteQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteQuery")
            .field("table", &self.base.table)
            .field("where", &self.where_clauses)
            .finish_non_exhaustive()
    }
}
