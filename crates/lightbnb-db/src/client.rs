//! Generic client trait for unified database access.

use crate::error::{DbError, DbResult};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait that unifies the things a query can run against.
///
/// Every repository operation takes `&impl GenericClient`, so callers can pass
/// a [`Database`](crate::Database), a pooled connection, or a bare
/// `tokio_postgres::Client`.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Vec<Row>>> + Send;

    /// Execute a query and return all rows, associating a tag for logging.
    ///
    /// The default implementation ignores `tag` and calls [`GenericClient::query`].
    fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Vec<Row>>> + Send {
        let _ = tag;
        self.query(sql, params)
    }

    /// Execute a query and return the **first** row.
    ///
    /// Semantics:
    /// - 0 rows: returns [`DbError::NotFound`]
    /// - 1 or more rows: returns the first row
    fn query_one_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Row>> + Send {
        async move {
            let rows = self.query_tagged(tag, sql, params).await?;
            rows.into_iter()
                .next()
                .ok_or_else(|| DbError::not_found(format!("{tag}: expected one row, got none")))
        }
    }

    /// Execute a query and return the first row, if any.
    fn query_opt_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = DbResult<Option<Row>>> + Send {
        async move {
            let rows = self.query_tagged(tag, sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(DbError::from_db_error)
    }
}

#[cfg(feature = "pool")]
impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        let client: &tokio_postgres::Client = self;
        GenericClient::query(client, sql, params).await
    }
}
