//! Column aliases, typed field references and typed column handles.
//!
//! A [`Column`] carries three compile-time markers besides its owning table:
//! the Rust value type, a value *kind* ([`Opaque`], [`Ordinal`], [`Text`]) and a
//! nullability ([`NotNull`], [`Nullable`]). The operator traits in
//! [`crate::operator`] are implemented only for the marker combinations that
//! allow them, so an operator a column's SQL type does not support fails to
//! compile instead of producing bad SQL at runtime.

use crate::render::RenderCtx;
use crate::schema::{Capabilities, Capability};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Marker type that names one table.
///
/// Implemented automatically for any small `Copy` type; generated code declares
/// one unit struct per table.
pub trait TableTag: fmt::Debug + Copy + Send + Sync + 'static {}

impl<T: fmt::Debug + Copy + Send + Sync + 'static> TableTag for T {}

/// Stable identifier of a column, optionally marked as a `COUNT(..)` projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnAlias {
    name: Arc<str>,
    count: bool,
}

impl ColumnAlias {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            count: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    /// The same column, projected as `COUNT(column)`.
    pub fn counted(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            count: true,
        }
    }
}

impl fmt::Display for ColumnAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A column of table `T`, used for projections, ordering, returning lists and
/// conflict targets.
pub struct Field<T> {
    alias: ColumnAlias,
    _table: PhantomData<fn() -> T>,
}

impl<T> Field<T> {
    pub fn new(alias: ColumnAlias) -> Self {
        Self {
            alias,
            _table: PhantomData,
        }
    }

    pub fn alias(&self) -> &ColumnAlias {
        &self.alias
    }

    pub fn name(&self) -> &str {
        self.alias.name()
    }

    pub fn is_count(&self) -> bool {
        self.alias.is_count()
    }

    /// `alias.column`, or `COUNT(alias.column)` for count fields.
    pub(crate) fn render_projection(&self, ctx: &mut RenderCtx<'_>, table_alias: &str) {
        if self.is_count() {
            ctx.push_sql("COUNT(");
            self.render_qualified(ctx, table_alias);
            ctx.push_char(')');
        } else {
            self.render_qualified(ctx, table_alias);
        }
    }

    pub(crate) fn render_qualified(&self, ctx: &mut RenderCtx<'_>, table_alias: &str) {
        ctx.push_sql(table_alias);
        ctx.push_char('.');
        ctx.push_sql(self.name());
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self::new(self.alias.clone())
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.alias).finish()
    }
}

impl<T> PartialEq for Field<T> {
    fn eq(&self, other: &Self) -> bool {
        self.alias == other.alias
    }
}

impl<T> Eq for Field<T> {}

impl<T> Hash for Field<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias.hash(state);
    }
}

/// Anything that names a column of table `T`.
pub trait AsField<T> {
    fn field(&self) -> Field<T>;
}

impl<T> AsField<T> for Field<T> {
    fn field(&self) -> Field<T> {
        self.clone()
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Value kind of a column, derived from its SQL type.
pub trait ValueKind: sealed::Sealed + Send + Sync + 'static {
    const CAPABILITIES: Capabilities;
}

/// Marker for kinds that support ordering, `BETWEEN`, `IN` and `ANY`.
pub trait Ordered: ValueKind {}

/// Marker for kinds that support `LIKE`/`ILIKE`.
pub trait Textual: Ordered {}

/// JSONB, HSTORE and array columns: equality only.
#[derive(Debug, Clone, Copy)]
pub enum Opaque {}

/// Numeric, boolean, temporal and UUID columns.
#[derive(Debug, Clone, Copy)]
pub enum Ordinal {}

/// TEXT and CHAR columns.
#[derive(Debug, Clone, Copy)]
pub enum Text {}

impl sealed::Sealed for Opaque {}
impl sealed::Sealed for Ordinal {}
impl sealed::Sealed for Text {}

impl ValueKind for Opaque {
    const CAPABILITIES: Capabilities = Capabilities::empty().with(Capability::Common);
}
impl ValueKind for Ordinal {
    const CAPABILITIES: Capabilities = Opaque::CAPABILITIES.with(Capability::Scalar);
}
impl ValueKind for Text {
    const CAPABILITIES: Capabilities = Ordinal::CAPABILITIES.with(Capability::Like);
}

impl Ordered for Ordinal {}
impl Ordered for Text {}
impl Textual for Text {}

/// Nullability of a column; decides the stored Rust type.
pub trait Nullability: sealed::Sealed + Send + Sync + 'static {
    /// Type written to and read from the column for a value type `V`.
    type Stored<V: ToSql + Send + Sync + 'static>: ToSql + Send + Sync + 'static;

    const NULLABLE: bool;
}

#[derive(Debug, Clone, Copy)]
pub enum NotNull {}

#[derive(Debug, Clone, Copy)]
pub enum Nullable {}

impl sealed::Sealed for NotNull {}
impl sealed::Sealed for Nullable {}

impl Nullability for NotNull {
    type Stored<V: ToSql + Send + Sync + 'static> = V;
    const NULLABLE: bool = false;
}

impl Nullability for Nullable {
    type Stored<V: ToSql + Send + Sync + 'static> = Option<V>;
    const NULLABLE: bool = true;
}

/// Capability groups implied by a kind/nullability pair.
pub fn marker_capabilities<K: ValueKind, N: Nullability>() -> Capabilities {
    if N::NULLABLE {
        K::CAPABILITIES.with(Capability::NullTest)
    } else {
        K::CAPABILITIES
    }
}

/// Typed handle to one column of table `T` holding values of type `V`.
pub struct Column<T, V, K = Opaque, N = NotNull> {
    alias: ColumnAlias,
    _marker: PhantomData<fn() -> (T, V, K, N)>,
}

impl<T, V, K, N> Column<T, V, K, N> {
    /// Build a handle without checking it against a descriptor.
    ///
    /// Generated code calls this with markers derived from the column's SQL type;
    /// use [`crate::TableDef::column`] when the markers come from elsewhere.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            alias: ColumnAlias::new(name),
            _marker: PhantomData,
        }
    }

    pub fn alias(&self) -> &ColumnAlias {
        &self.alias
    }

    pub fn name(&self) -> &str {
        self.alias.name()
    }
}

impl<T, V, K, N> AsField<T> for Column<T, V, K, N> {
    fn field(&self) -> Field<T> {
        Field::new(self.alias.clone())
    }
}

impl<T, V, K, N> Clone for Column<T, V, K, N> {
    fn clone(&self) -> Self {
        Self {
            alias: self.alias.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T, V, K, N> fmt::Debug for Column<T, V, K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.alias.name())
            .field("value", &std::any::type_name::<V>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Users;

    #[test]
    fn test_counted_alias_keeps_name() {
        let a = ColumnAlias::new("id");
        let c = a.counted();
        assert_eq!(c.name(), "id");
        assert!(c.is_count());
        assert!(!a.is_count());
    }

    #[test]
    fn test_field_equality_ignores_table_marker_bounds() {
        let id: Column<Users, i64, Ordinal> = Column::new("id");
        assert_eq!(id.field(), Field::<Users>::new(ColumnAlias::new("id")));
        assert_ne!(id.field(), Field::<Users>::new(ColumnAlias::new("id").counted()));
    }

    #[test]
    fn test_marker_capabilities() {
        let text = marker_capabilities::<Text, Nullable>();
        assert_eq!(
            text.iter().collect::<Vec<_>>(),
            vec![
                Capability::Common,
                Capability::Scalar,
                Capability::Like,
                Capability::NullTest
            ]
        );
        let opaque = marker_capabilities::<Opaque, NotNull>();
        assert_eq!(opaque.iter().collect::<Vec<_>>(), vec![Capability::Common]);
    }
}
