//! Statement builders.
//!
//! ```ignore
//! let users = Users::new();
//!
//! let (sql, args) = users
//!     .table
//!     .select([users.id.field(), users.email.field()])
//!     .filter(users.age.gte(18))
//!     .filter(users.email.ilike("example.com"))
//!     .order_by_desc([users.created_at.field()])
//!     .limit(20)
//!     .build();
//! // SELECT users.id, users.email FROM users AS users
//! //   WHERE users.age >= $1 AND users.email ILIKE '%' || $2::text || '%'
//! //   ORDER BY users.created_at DESC LIMIT 20;
//! ```

mod base;
mod delete;
mod insert;
mod select;
mod update;


pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use select::SelectQuery;
pub use update::UpdateQuery;

pub(crate) use base::Base;

use crate::error::OrmResult;
use crate::param::ParamList;
use crate::render::{RenderCtx, RenderMode, scratch};
use std::fmt;

/// A complete statement that can be rendered on its own or embedded in another.
pub trait Statement: fmt::Debug + Send + Sync {
    /// Alias used to qualify this statement's columns.
    fn table_alias(&self) -> &str;

    /// Render into a shared context.
    ///
    /// `mode` is [`RenderMode::Embedded`] when this statement is a sub-query;
    /// the `;` terminator is written only for [`RenderMode::TopLevel`].
    fn render(&self, ctx: &mut RenderCtx<'_>, mode: RenderMode);

    /// Column names the result rows carry, in order.
    ///
    /// For SELECT this is the projection, for mutations the RETURNING list. Row
    /// scanning relies on this order.
    fn scan_fields(&self) -> Vec<&str>;

    /// Check builder state before execution.
    fn validate(&self) -> OrmResult<()> {
        Ok(())
    }

    /// Expected length of the rendered SQL.
    fn size_hint(&self) -> usize {
        128
    }

    /// Render as a top-level statement with placeholders numbered from `$1`.
    ///
    /// Every call is an independent pass, so repeated calls return identical text.
    fn build(&self) -> (String, ParamList) {
        let mut buf = scratch(self.size_hint());
        let mut args = ParamList::new();
        let mut ctx = RenderCtx::new(&mut buf, &mut args);
        self.render(&mut ctx, RenderMode::TopLevel);
        let sql = buf.as_str().to_owned();
        tracing::trace!(target: "pgtyped.sql", sql = %sql, args = args.len(), "rendered statement");
        (sql, args)
    }
}
