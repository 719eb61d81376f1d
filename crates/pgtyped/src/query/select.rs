//! SELECT builder.

use super::Statement;
use super::base::{Base, terminate};
use crate::clause::Clause;
use crate::column::Field;
use crate::render::{RenderCtx, RenderMode};
use std::fmt::Write as _;
use std::sync::Arc;

/// `SELECT [DISTINCT] .. FROM table AS alias [WHERE ..] [GROUP BY ..] [ORDER BY ..]
/// [LIMIT n] [OFFSET n] [FOR UPDATE]`
pub struct SelectQuery<T> {
    base: Base<T>,
    distinct: bool,
    where_clauses: Vec<Clause<T>>,
    group_by: Vec<Field<T>>,
    order_asc: Vec<Field<T>>,
    order_desc: Vec<Field<T>>,
    limit: u64,
    offset: u64,
    for_update: bool,
}

impl<T> SelectQuery<T> {
    pub(crate) fn new(base: Base<T>) -> Self {
        Self {
            base,
            distinct: false,
            where_clauses: Vec::new(),
            group_by: Vec::new(),
            order_asc: Vec::new(),
            order_desc: Vec::new(),
            limit: 0,
            offset: 0,
            for_update: false,
        }
    }

    /// Replace the projection. An empty projection selects the literal `1`.
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.base.using = fields.into_iter().collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Qualify columns with `alias` instead of the table name.
    pub fn alias(mut self, alias: impl Into<Arc<str>>) -> Self {
        self.base.alias = alias.into();
        self
    }

    /// Add a condition; conditions are joined with `AND`.
    pub fn filter(mut self, clause: Clause<T>) -> Self {
        self.where_clauses.push(clause);
        self
    }

    pub fn filter_all(mut self, clauses: impl IntoIterator<Item = Clause<T>>) -> Self {
        self.where_clauses.extend(clauses);
        self
    }

    pub fn group_by(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.group_by.extend(fields);
        self
    }

    /// Ascending keys are always emitted before descending ones.
    pub fn order_by_asc(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.order_asc.extend(fields);
        self
    }

    pub fn order_by_desc(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.order_desc.extend(fields);
        self
    }

    /// `0` leaves the query unbounded.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    pub fn set_limit(&mut self, limit: u64) {
        self.limit = limit;
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    pub fn set_order_by(&mut self, asc: bool, fields: impl IntoIterator<Item = Field<T>>) {
        if asc {
            self.order_asc.extend(fields);
        } else {
            self.order_desc.extend(fields);
        }
    }

    pub fn push_filter(&mut self, clause: Clause<T>) {
        self.where_clauses.push(clause);
    }

    pub fn projection(&self) -> &[Field<T>] {
        &self.base.using
    }
}

impl<T> Statement for SelectQuery<T> {
    fn table_alias(&self) -> &str {
        &self.base.alias
    }

    fn render(&self, ctx: &mut RenderCtx<'_>, mode: RenderMode) {
        let alias = &*self.base.alias;

        ctx.push_sql("SELECT ");
        if self.distinct {
            ctx.push_sql("DISTINCT ");
        }
        if self.base.using.is_empty() {
            ctx.push_char('1');
        }
        for (i, f) in self.base.using.iter().enumerate() {
            if i > 0 {
                ctx.push_sql(", ");
            }
            f.render_projection(ctx, alias);
        }

        ctx.push_sql(" FROM ");
        ctx.push_sql(&self.base.table);
        ctx.push_sql(" AS ");
        ctx.push_sql(alias);

        self.base.render_where(ctx, &self.where_clauses);

        if !self.group_by.is_empty() {
            ctx.push_sql(" GROUP BY ");
            for (i, f) in self.group_by.iter().enumerate() {
                if i > 0 {
                    ctx.push_sql(", ");
                }
                f.render_qualified(ctx, alias);
            }
        }

        if !self.order_asc.is_empty() || !self.order_desc.is_empty() {
            ctx.push_sql(" ORDER BY ");
            let keys = self
                .order_asc
                .iter()
                .map(|f| (f, " ASC"))
                .chain(self.order_desc.iter().map(|f| (f, " DESC")));
            for (i, (f, dir)) in keys.enumerate() {
                if i > 0 {
                    ctx.push_sql(", ");
                }
                f.render_qualified(ctx, alias);
                ctx.push_sql(dir);
            }
        }

        let mut tail = String::new();
        if self.limit > 0 {
            let _ = write!(tail, " LIMIT {}", self.limit);
        }
        if self.offset > 0 {
            let _ = write!(tail, " OFFSET {}", self.offset);
        }
        ctx.push_sql(&tail);

        if self.for_update {
            ctx.push_sql(" FOR UPDATE");
        }
        terminate(ctx, mode);
    }

    fn scan_fields(&self) -> Vec<&str> {
        self.base.scan_fields()
    }

    fn size_hint(&self) -> usize {
        128 + (self.where_clauses.len()
            + self.order_asc.len()
            + self.order_desc.len()
            + self.group_by.len())
            * 32
            + self.base.using.len() * 16
    }
}

impl<T> Clone for SelectQuery<T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            distinct: self.distinct,
            where_clauses: self.where_clauses.clone(),
            group_by: self.group_by.clone(),
            order_asc: self.order_asc.clone(),
            order_desc: self.order_desc.clone(),
            limit: self.limit,
            offset: self.offset,
            for_update: self.for_update,
        }
    }
}

impl<T> std::fmt::Debug for SelectQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectQuery")
            .field("table", &self.base.table)
            .field("alias", &self.base.alias)
            .field("fields", &self.base.using)
            .field("where", &self.where_clauses)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}
