//! Generic client trait for unified database access.

use crate::error::{OrmError, OrmResult};
use bytes::Bytes;
use tokio_postgres::types::ToSql;
use tokio_postgres::{CopyInSink, Row};

/// A trait that unifies database clients and transactions.
///
/// Table and repository methods accept either a direct connection, a pooled
/// connection or a transaction. Cancellation follows the usual async rule:
/// dropping a returned future abandons the call.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Execute a query and return the **first** row.
    ///
    /// Returns [`OrmError::NotFound`] when the query yields no rows; extra rows
    /// are ignored.
    fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<Row>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| OrmError::not_found("Expected one row, got none"))
        }
    }

    /// Execute a query and return the first row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Start a `COPY .. FROM STDIN` and return the sink rows are written to.
    ///
    /// The default implementation reports that COPY is unsupported.
    fn copy_in(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = OrmResult<CopyInSink<Bytes>>> + Send {
        let _ = sql;
        async {
            Err(OrmError::Other(
                "COPY is not supported by this client".to_string(),
            ))
        }
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        Ok(tokio_postgres::Client::query(self, sql, params).await?)
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Option<Row>> {
        Ok(tokio_postgres::Client::query_opt(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, params).await?)
    }

    async fn copy_in(&self, sql: &str) -> OrmResult<CopyInSink<Bytes>> {
        Ok(tokio_postgres::Client::copy_in(self, sql).await?)
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        Ok(tokio_postgres::Transaction::query(self, sql, params).await?)
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Option<Row>> {
        Ok(tokio_postgres::Transaction::query_opt(self, sql, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        Ok(tokio_postgres::Transaction::execute(self, sql, params).await?)
    }

    async fn copy_in(&self, sql: &str) -> OrmResult<CopyInSink<Bytes>> {
        Ok(tokio_postgres::Transaction::copy_in(self, sql).await?)
    }
}

// ===== deadpool-postgres support =====

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper -> tokio_postgres::Client).
        let client: &tokio_postgres::Client = self;
        GenericClient::query(client, sql, params).await
    }

    async fn query_opt(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<Option<Row>> {
        let client: &tokio_postgres::Client = self;
        GenericClient::query_opt(client, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        let client: &tokio_postgres::Client = self;
        GenericClient::execute(client, sql, params).await
    }

    async fn copy_in(&self, sql: &str) -> OrmResult<CopyInSink<Bytes>> {
        let client: &tokio_postgres::Client = self;
        GenericClient::copy_in(client, sql).await
    }
}
