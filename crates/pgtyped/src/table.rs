//! Table definitions: the column universe of one table, statement entry points
//! and execution.

use crate::clause::Clause;
use crate::client::GenericClient;
use crate::column::{Column, ColumnAlias, Field, Nullability, ValueKind, marker_capabilities};
use crate::error::{OrmError, OrmResult};
use crate::monitor;
use crate::param::Param;
use crate::query::{Base, DeleteQuery, InsertQuery, SelectQuery, Statement, UpdateQuery};
use crate::record::Record;
use crate::schema::{Capabilities, ColumnDescriptor};
use crate::setter::ValueSetter;
use futures_util::pin_mut;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::ToSql;

/// One table: its name, query alias and ordered column descriptors.
///
/// Cheap to clone; clones share the descriptor and field lists.
pub struct TableDef<T> {
    name: Arc<str>,
    alias: Arc<str>,
    descriptors: Arc<[ColumnDescriptor]>,
    fields: Arc<[Field<T>]>,
}

impl<T> TableDef<T> {
    /// Define a table. Column order is the order of `descriptors` and is used
    /// for `select_all`, `returning_all` and bulk copy.
    pub fn new(name: impl Into<Arc<str>>, descriptors: Vec<ColumnDescriptor>) -> Self {
        let name = name.into();
        let fields = descriptors
            .iter()
            .map(|d| Field::new(ColumnAlias::new(d.name.as_str())))
            .collect();
        Self {
            alias: Arc::clone(&name),
            name,
            descriptors: descriptors.into(),
            fields,
        }
    }

    /// Use `alias` to qualify columns in SELECT statements.
    pub fn with_alias(mut self, alias: impl Into<Arc<str>>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn descriptors(&self) -> &[ColumnDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn all_fields(&self) -> Vec<Field<T>> {
        self.fields.to_vec()
    }

    /// Every field except those in `skip`, in table order.
    pub fn all_fields_except(&self, skip: &[Field<T>]) -> Vec<Field<T>> {
        self.fields
            .iter()
            .filter(|f| !skip.iter().any(|s| s.name() == f.name()))
            .cloned()
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<Field<T>> {
        self.fields.iter().find(|f| f.name() == name).cloned()
    }

    /// Typed handle for `name`, checked against its descriptor.
    ///
    /// Fails with [`OrmError::Capability`] when the markers ask for an operator
    /// group the column's SQL type does not support, or when the nullability
    /// marker disagrees with the descriptor.
    pub fn column<V, K, N>(&self, name: &str) -> OrmResult<Column<T, V, K, N>>
    where
        K: ValueKind,
        N: Nullability,
    {
        let desc = self
            .descriptor(name)
            .ok_or_else(|| OrmError::capability(name, format!("no such column in {}", self.name)))?;
        let wanted = marker_capabilities::<K, N>();
        let have = desc.capabilities();
        if !have.is_superset_of(wanted) {
            return Err(OrmError::capability(
                name,
                format!(
                    "{} {} supports [{}], handle requires [{}]",
                    desc.sql_type,
                    if desc.array { "array" } else { "column" },
                    group_names(have),
                    group_names(wanted)
                ),
            ));
        }
        if N::NULLABLE != desc.nullable {
            return Err(OrmError::capability(
                name,
                if desc.nullable {
                    "column is nullable, handle is not"
                } else {
                    "column is not nullable, handle is"
                },
            ));
        }
        Ok(Column::new(desc.name.as_str()))
    }

    fn base(&self, alias: &Arc<str>, using: Vec<Field<T>>) -> Base<T> {
        Base::new(
            Arc::clone(&self.name),
            Arc::clone(alias),
            using,
            Arc::clone(&self.fields),
        )
    }

    /// `SELECT fields FROM table AS alias`; scanning follows `fields` order.
    pub fn select(&self, fields: impl IntoIterator<Item = Field<T>>) -> SelectQuery<T> {
        SelectQuery::new(self.base(&self.alias, fields.into_iter().collect()))
    }

    /// `SELECT 1 FROM ..`, for existence checks and sub-queries.
    pub fn select_one(&self) -> SelectQuery<T> {
        self.select(Vec::new())
    }

    pub fn select_all(&self) -> SelectQuery<T> {
        self.select(self.all_fields())
    }

    pub fn insert(&self) -> InsertQuery<T> {
        InsertQuery::new(self.base(&self.name, Vec::new()))
    }

    pub fn update(&self) -> UpdateQuery<T> {
        UpdateQuery::new(self.base(&self.name, Vec::new()))
    }

    pub fn delete(&self) -> DeleteQuery<T> {
        DeleteQuery::new(self.base(&self.name, Vec::new()))
    }

    pub fn raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<T> {
        Clause::raw(sql, args)
    }

    pub fn exists_raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<T> {
        Clause::exists(Clause::raw(sql, args))
    }

    pub fn not_exists_raw(&self, sql: impl Into<Cow<'static, str>>, args: Vec<Param>) -> Clause<T> {
        Clause::not_exists(Clause::raw(sql, args))
    }

    pub fn exists_of(&self, query: impl Statement + 'static) -> Clause<T> {
        Clause::exists(Clause::sub_query(query))
    }

    pub fn not_exists_of(&self, query: impl Statement + 'static) -> Clause<T> {
        Clause::not_exists(Clause::sub_query(query))
    }

    pub fn and(&self, clauses: Vec<Clause<T>>) -> Clause<T> {
        Clause::and(clauses)
    }

    pub fn or(&self, clauses: Vec<Clause<T>>) -> Clause<T> {
        Clause::or(clauses)
    }

    /// One value setter per field, reading values from `record`.
    pub fn setters<R: Record>(&self, record: &R, fields: &[Field<T>]) -> OrmResult<Vec<ValueSetter<T>>> {
        let values = record.values(fields)?;
        Ok(fields
            .iter()
            .cloned()
            .zip(values)
            .map(|(f, v)| ValueSetter::value(f, v))
            .collect())
    }

    /// `INSERT .. ON CONFLICT (conflict) DO UPDATE SET f=EXCLUDED.f` for each
    /// field of `update`.
    pub fn upsert(
        &self,
        setters: Vec<ValueSetter<T>>,
        conflict: &[Field<T>],
        update: &[Field<T>],
    ) -> OrmResult<InsertQuery<T>> {
        if conflict.is_empty() {
            return Err(OrmError::empty_fields("conflict fields are empty for upsert"));
        }
        if update.is_empty() {
            return Err(OrmError::empty_fields("update fields are empty for upsert"));
        }
        Ok(self
            .insert()
            .from(setters)
            .on_conflict(conflict.iter().cloned())
            .do_update(update.iter().cloned()))
    }

    /// `INSERT .. ON CONFLICT (conflict) DO NOTHING`.
    pub fn upsert_ignore(
        &self,
        setters: Vec<ValueSetter<T>>,
        conflict: &[Field<T>],
    ) -> OrmResult<InsertQuery<T>> {
        if conflict.is_empty() {
            return Err(OrmError::empty_fields("conflict fields are empty for upsert ignore"));
        }
        Ok(self
            .insert()
            .from(setters)
            .on_conflict(conflict.iter().cloned())
            .do_nothing())
    }

    /// Run `stmt` and scan every row into `R`, in projection order.
    pub async fn query<R, C, S>(&self, conn: &C, stmt: &S) -> OrmResult<Vec<R>>
    where
        R: Record,
        C: GenericClient,
        S: Statement,
    {
        stmt.validate()?;
        let (sql, args) = stmt.build();
        let columns = stmt.scan_fields();
        monitor::before_query("query", &sql, args.len());
        let start = Instant::now();
        let rows = conn.query(&sql, &args.as_refs()).await?;
        monitor::after_query("query", rows.len() as u64, start.elapsed());
        rows.iter().map(|row| R::from_row(row, &columns)).collect()
    }

    /// Run `stmt` and scan the first row; [`OrmError::NotFound`] when there is none.
    pub async fn query_row<R, C, S>(&self, conn: &C, stmt: &S) -> OrmResult<R>
    where
        R: Record,
        C: GenericClient,
        S: Statement,
    {
        self.query_opt(conn, stmt)
            .await?
            .ok_or_else(|| OrmError::not_found(format!("no row in {}", self.name)))
    }

    pub async fn query_opt<R, C, S>(&self, conn: &C, stmt: &S) -> OrmResult<Option<R>>
    where
        R: Record,
        C: GenericClient,
        S: Statement,
    {
        stmt.validate()?;
        let (sql, args) = stmt.build();
        let columns = stmt.scan_fields();
        monitor::before_query("query_row", &sql, args.len());
        let start = Instant::now();
        let row = conn.query_opt(&sql, &args.as_refs()).await?;
        monitor::after_query("query_row", u64::from(row.is_some()), start.elapsed());
        row.map(|row| R::from_row(&row, &columns)).transpose()
    }

    /// Run `stmt` and return the number of affected rows.
    pub async fn execute<C, S>(&self, conn: &C, stmt: &S) -> OrmResult<u64>
    where
        C: GenericClient,
        S: Statement,
    {
        stmt.validate()?;
        let (sql, args) = stmt.build();
        monitor::before_query("execute", &sql, args.len());
        let start = Instant::now();
        let affected = conn.execute(&sql, &args.as_refs()).await?;
        monitor::after_query("execute", affected, start.elapsed());
        Ok(affected)
    }

    /// Bulk load `rows` with binary `COPY .. FROM STDIN`, writing `fields` of each
    /// record in order. Returns the number of rows copied.
    pub async fn copy_from<R, C>(&self, conn: &C, rows: &[R], fields: &[Field<T>]) -> OrmResult<u64>
    where
        R: Record,
        C: GenericClient,
    {
        if fields.is_empty() {
            return Err(OrmError::empty_fields("copy fields are empty"));
        }
        let mut types = Vec::with_capacity(fields.len());
        for f in fields {
            let desc = self.descriptor(f.name()).ok_or_else(|| {
                OrmError::Other(format!("copy into {}: unknown column {}", self.name, f.name()))
            })?;
            let ty = desc.pg_type().ok_or_else(|| {
                OrmError::Other(format!(
                    "copy into {}: column {} has no binary COPY type",
                    self.name,
                    f.name()
                ))
            })?;
            types.push(ty);
        }
        if rows.is_empty() {
            return Ok(0);
        }

        let names: Vec<&str> = fields.iter().map(Field::name).collect();
        let sql = format!(
            "COPY {} ({}) FROM STDIN BINARY",
            self.name,
            names.join(", ")
        );
        monitor::before_query("copy_from", &sql, 0);
        let start = Instant::now();

        let sink = conn.copy_in(&sql).await?;
        let writer = BinaryCopyInWriter::new(sink, &types);
        pin_mut!(writer);
        for rec in rows {
            let values = rec.values(fields)?;
            let refs: Vec<&(dyn ToSql + Sync)> = values.iter().map(Param::as_ref).collect();
            writer.as_mut().write(&refs).await?;
        }
        let copied = writer.finish().await?;

        monitor::after_query("copy_from", copied, start.elapsed());
        Ok(copied)
    }
}

fn group_names(caps: Capabilities) -> String {
    caps.iter()
        .map(|c| c.trait_name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl<T> Clone for TableDef<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            alias: Arc::clone(&self.alias),
            descriptors: Arc::clone(&self.descriptors),
            fields: Arc::clone(&self.fields),
        }
    }
}

impl<T> std::fmt::Debug for TableDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableDef")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("columns", &self.descriptors)
            .finish()
    }
}
