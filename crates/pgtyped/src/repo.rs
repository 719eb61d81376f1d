//! Record-level CRUD helpers over a [`TableDef`].
//!
//! ```ignore
//! let repo = Repository::<UsersTable, User>::new(users.table.clone());
//!
//! repo.insert(&client, &user, &CallOptions::new()).await?;
//!
//! let saved = repo
//!     .upsert_returning(&client, &user, &[users.email.field()], &CallOptions::new())
//!     .await?;
//!
//! let active = repo
//!     .list_by(&client, &users.table.select_all().filter(users.active.eq(true)))
//!     .await?;
//! ```

use crate::clause::Clause;
use crate::client::GenericClient;
use crate::column::Field;
use crate::error::{OrmError, OrmResult};
use crate::query::{InsertQuery, Statement};
use crate::record::Record;
use crate::table::TableDef;
use std::marker::PhantomData;

/// Per-call field selection.
///
/// Unset lists default to "every column except `exclude`".
pub struct CallOptions<T> {
    conflict: Vec<Field<T>>,
    update: Option<Vec<Field<T>>>,
    copy: Option<Vec<Field<T>>>,
    exclude: Vec<Field<T>>,
}

impl<T> CallOptions<T> {
    pub fn new() -> Self {
        Self {
            conflict: Vec::new(),
            update: None,
            copy: None,
            exclude: Vec::new(),
        }
    }

    /// Conflict target for [`Repository::upsert_ignore`].
    pub fn conflict(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.conflict = fields.into_iter().collect();
        self
    }

    /// Columns written by updates and by the `DO UPDATE` arm of upserts.
    pub fn update(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.update = Some(fields.into_iter().collect());
        self
    }

    /// Columns written by [`Repository::insert_many`].
    pub fn copy(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.copy = Some(fields.into_iter().collect());
        self
    }

    /// Columns left out of inserts and defaulted lists, e.g. generated keys.
    pub fn exclude(mut self, fields: impl IntoIterator<Item = Field<T>>) -> Self {
        self.exclude = fields.into_iter().collect();
        self
    }
}

impl<T> Default for CallOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// CRUD over table `T` with records of type `R`.
pub struct Repository<T, R> {
    table: TableDef<T>,
    _record: PhantomData<fn() -> R>,
}

impl<T, R: Record> Repository<T, R> {
    pub fn new(table: TableDef<T>) -> Self {
        Self {
            table,
            _record: PhantomData,
        }
    }

    pub fn table(&self) -> &TableDef<T> {
        &self.table
    }

    fn insert_fields(&self, opts: &CallOptions<T>) -> Vec<Field<T>> {
        self.table.all_fields_except(&opts.exclude)
    }

    fn update_fields(&self, opts: &CallOptions<T>, also_skip: &[Field<T>]) -> Vec<Field<T>> {
        match &opts.update {
            Some(fields) => fields.clone(),
            None => {
                let mut skip = opts.exclude.clone();
                skip.extend_from_slice(also_skip);
                self.table.all_fields_except(&skip)
            }
        }
    }

    fn insert_query(&self, record: &R, opts: &CallOptions<T>) -> OrmResult<InsertQuery<T>> {
        let fields = self.insert_fields(opts);
        if fields.is_empty() {
            return Err(OrmError::empty_fields("insert fields are empty"));
        }
        let setters = self.table.setters(record, &fields)?;
        Ok(self.table.insert().from(setters))
    }

    fn upsert_query(
        &self,
        record: &R,
        conflict: &[Field<T>],
        opts: &CallOptions<T>,
    ) -> OrmResult<InsertQuery<T>> {
        if conflict.is_empty() {
            return Err(OrmError::empty_fields("conflict fields are empty for upsert"));
        }
        let update = self.update_fields(opts, conflict);
        if update.is_empty() {
            return Err(OrmError::empty_fields("update fields are empty for upsert"));
        }
        let setters = self.table.setters(record, &self.insert_fields(opts))?;
        self.table.upsert(setters, conflict, &update)
    }

    pub async fn insert<C: GenericClient>(
        &self,
        conn: &C,
        record: &R,
        opts: &CallOptions<T>,
    ) -> OrmResult<u64> {
        let q = self.insert_query(record, opts)?;
        self.table.execute(conn, &q).await
    }

    /// Insert and read the stored row back, including generated columns.
    pub async fn insert_returning<C: GenericClient>(
        &self,
        conn: &C,
        record: &R,
        opts: &CallOptions<T>,
    ) -> OrmResult<R> {
        let q = self.insert_query(record, opts)?.returning_all();
        self.table.query_row(conn, &q).await
    }

    /// Bulk insert with binary COPY.
    pub async fn insert_many<C: GenericClient>(
        &self,
        conn: &C,
        records: &[R],
        opts: &CallOptions<T>,
    ) -> OrmResult<u64> {
        let fields = match &opts.copy {
            Some(fields) => fields.clone(),
            None => self.insert_fields(opts),
        };
        if fields.is_empty() {
            return Err(OrmError::empty_fields("copy fields are empty"));
        }
        self.table.copy_from(conn, records, &fields).await
    }

    /// Update the rows matching `filter` with the record's values.
    pub async fn update<C: GenericClient>(
        &self,
        conn: &C,
        record: &R,
        filter: Clause<T>,
        opts: &CallOptions<T>,
    ) -> OrmResult<u64> {
        let fields = self.update_fields(opts, &[]);
        let setters = self.table.setters(record, &fields)?;
        let q = self.table.update().set_all(setters).filter(filter);
        self.table.execute(conn, &q).await
    }

    pub async fn update_returning<C: GenericClient>(
        &self,
        conn: &C,
        record: &R,
        filter: Clause<T>,
        opts: &CallOptions<T>,
    ) -> OrmResult<R> {
        let fields = self.update_fields(opts, &[]);
        let setters = self.table.setters(record, &fields)?;
        let q = self
            .table
            .update()
            .set_all(setters)
            .filter(filter)
            .returning_all();
        self.table.query_row(conn, &q).await
    }

    /// Insert, or on a `conflict` collision update every non-conflict column
    /// (or the columns set with [`CallOptions::update`]).
    pub async fn upsert<C: GenericClient>(
        &self,
        conn: &C,
        record: &R,
        conflict: &[Field<T>],
        opts: &CallOptions<T>,
    ) -> OrmResult<u64> {
        let q = self.upsert_query(record, conflict, opts)?;
        self.table.execute(conn, &q).await
    }

    pub async fn upsert_returning<C: GenericClient>(
        &self,
        conn: &C,
        record: &R,
        conflict: &[Field<T>],
        opts: &CallOptions<T>,
    ) -> OrmResult<R> {
        let q = self.upsert_query(record, conflict, opts)?.returning_all();
        self.table.query_row(conn, &q).await
    }

    /// Insert unless the [`CallOptions::conflict`] target already exists.
    pub async fn upsert_ignore<C: GenericClient>(
        &self,
        conn: &C,
        record: &R,
        opts: &CallOptions<T>,
    ) -> OrmResult<u64> {
        if opts.conflict.is_empty() {
            return Err(OrmError::empty_fields(
                "conflict fields are empty for upsert ignore",
            ));
        }
        let setters = self.table.setters(record, &self.insert_fields(opts))?;
        let q = self.table.upsert_ignore(setters, &opts.conflict)?;
        self.table.execute(conn, &q).await
    }

    pub async fn get_by<C: GenericClient, S: Statement>(&self, conn: &C, stmt: &S) -> OrmResult<R> {
        self.table.query_row(conn, stmt).await
    }

    pub async fn list_by<C: GenericClient, S: Statement>(
        &self,
        conn: &C,
        stmt: &S,
    ) -> OrmResult<Vec<R>> {
        self.table.query(conn, stmt).await
    }

    pub async fn exec<C: GenericClient, S: Statement>(&self, conn: &C, stmt: &S) -> OrmResult<()> {
        self.table.execute(conn, stmt).await.map(|_| ())
    }

    pub async fn exec_affected<C: GenericClient, S: Statement>(
        &self,
        conn: &C,
        stmt: &S,
    ) -> OrmResult<u64> {
        self.table.execute(conn, stmt).await
    }
}

impl<T, R> Clone for Repository<T, R> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            _record: PhantomData,
        }
    }
}

impl<T, R> std::fmt::Debug for Repository<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("table", &self.table.name())
            .finish()
    }
}
