use crate::clause::Clause;
use crate::column::Field;
use crate::render::{RenderCtx, RenderMode};
use std::sync::Arc;

/// State shared by all four builders.
pub(crate) struct Base<T> {
    pub(crate) table: Arc<str>,
    pub(crate) alias: Arc<str>,
    /// Projection for SELECT, RETURNING list for mutations.
    pub(crate) using: Vec<Field<T>>,
    pub(crate) all: Arc<[Field<T>]>,
}

impl<T> Base<T> {
    pub(crate) fn new(
        table: Arc<str>,
        alias: Arc<str>,
        using: Vec<Field<T>>,
        all: Arc<[Field<T>]>,
    ) -> Self {
        Self {
            table,
            alias,
            using,
            all,
        }
    }

    pub(crate) fn scan_fields(&self) -> Vec<&str> {
        self.using.iter().map(Field::name).collect()
    }

    pub(crate) fn returns_all(&self) -> bool {
        !self.using.is_empty() && self.using.as_slice() == &*self.all
    }

    /// ` RETURNING a, b`. The full column set is listed by name rather than `*`
    /// so result order always matches [`Base::scan_fields`]; an empty set omits
    /// the clause.
    pub(crate) fn render_returning(&self, ctx: &mut RenderCtx<'_>) {
        let fields: &[Field<T>] = if self.returns_all() {
            &self.all
        } else {
            &self.using
        };
        if fields.is_empty() {
            return;
        }
        ctx.push_sql(" RETURNING ");
        push_names(ctx, fields);
    }

    pub(crate) fn render_where(&self, ctx: &mut RenderCtx<'_>, clauses: &[Clause<T>]) {
        if clauses.is_empty() {
            return;
        }
        ctx.push_sql(" WHERE ");
        for (i, clause) in clauses.iter().enumerate() {
            if i > 0 {
                ctx.push_sql(" AND ");
            }
            clause.render(ctx, &self.alias);
        }
    }
}

impl<T> Clone for Base<T> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
            alias: Arc::clone(&self.alias),
            using: self.using.clone(),
            all: Arc::clone(&self.all),
        }
    }
}

/// Unqualified, comma separated column names.
pub(crate) fn push_names<T>(ctx: &mut RenderCtx<'_>, fields: &[Field<T>]) {
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            ctx.push_sql(", ");
        }
        ctx.push_sql(f.name());
    }
}

pub(crate) fn terminate(ctx: &mut RenderCtx<'_>, mode: RenderMode) {
    if mode == RenderMode::TopLevel {
        ctx.push_char(';');
    }
}
