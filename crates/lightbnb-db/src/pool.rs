//! Connection pool and the process-wide `Database` handle.

use crate::client::GenericClient;
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Timeouts};
use tokio_postgres::types::ToSql;
use tokio_postgres::{NoTls, Row};

/// Longest SQL text written to a log event, in bytes.
const MAX_LOGGED_SQL: usize = 200;

/// Create a connection pool from configuration.
///
/// No connection is opened until the first checkout.
pub fn create_pool(config: &DbConfig) -> DbResult<Pool> {
    let pg_config = config.to_pg_config()?;
    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    Pool::builder(mgr)
        .max_size(config.pool_size)
        .timeouts(Timeouts {
            wait: config.wait_timeout,
            ..Timeouts::default()
        })
        .runtime(deadpool_postgres::Runtime::Tokio1)
        .build()
        .map_err(|e| DbError::Pool(e.to_string()))
}

/// The application's database handle.
///
/// Create one at startup with [`Database::connect`], pass `&Database` to the
/// repository functions, and call [`Database::close`] at shutdown. Clones
/// share the same pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Build the pool described by `config`.
    pub fn connect(config: &DbConfig) -> DbResult<Self> {
        let pool = create_pool(config)?;
        tracing::info!(
            target: "lightbnb.pool",
            max_size = config.pool_size,
            "database pool created"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: Pool) -> Self {
        Self { pool }
    }

    /// Open one connection to verify the database is reachable.
    pub async fn ping(&self) -> DbResult<()> {
        let client = self.pool.get().await?;
        GenericClient::query(&client, "SELECT 1", &[]).await?;
        Ok(())
    }

    /// Close the pool. Idle connections are dropped and later checkouts fail.
    pub fn close(&self) {
        self.pool.close();
        tracing::info!(target: "lightbnb.pool", "database pool closed");
    }

    /// Whether [`Database::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// The underlying pool.
    pub fn pool(&self) -> &Pool {
        &self.pool
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.pool.status();
        f.debug_struct("Database")
            .field("max_size", &status.max_size)
            .field("size", &status.size)
            .field("available", &status.available)
            .finish()
    }
}

impl GenericClient for Database {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> DbResult<Vec<Row>> {
        self.query_tagged("sql", sql, params).await
    }

    async fn query_tagged(
        &self,
        tag: &str,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> DbResult<Vec<Row>> {
        tracing::debug!(
            target: "lightbnb.sql",
            tag,
            param_count = params.len(),
            sql = %truncate_sql(sql, MAX_LOGGED_SQL),
            "executing"
        );

        let result = match self.pool.get().await {
            Ok(client) => GenericClient::query(&client, sql, params).await,
            Err(e) => Err(DbError::from(e)),
        };

        match &result {
            Ok(rows) => {
                tracing::trace!(target: "lightbnb.sql", tag, rows = rows.len(), "query ok");
            }
            Err(e) => {
                tracing::error!(target: "lightbnb.sql", tag, error = %e, "query failed");
            }
        }
        result
    }
}

fn truncate_sql(sql: &str, max_bytes: usize) -> std::borrow::Cow<'_, str> {
    if sql.len() <= max_bytes {
        return sql.into();
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &sql[..end]).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sql_is_not_truncated() {
        assert_eq!(truncate_sql("SELECT 1", 200), "SELECT 1");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_sql("SELECT 'é'", 9), "SELECT '...");
    }

    #[tokio::test]
    async fn closed_database_rejects_queries() {
        let db = Database::connect(&DbConfig::from_url("postgres://u@localhost/none")).unwrap();
        assert!(!db.is_closed());
        db.close();
        assert!(db.is_closed());

        let err = db.query("SELECT 1", &[]).await.unwrap_err();
        assert!(err.is_connection());
    }

    #[tokio::test]
    async fn ping_fails_after_close() {
        let db = Database::connect(&DbConfig::from_url("postgres://u@localhost/none")).unwrap();
        db.close();

        let err = db.ping().await.unwrap_err();
        assert!(err.is_connection(), "{err:?}");
    }

    #[tokio::test]
    async fn from_pool_shares_the_given_pool() {
        let cfg = DbConfig::from_url("postgres://u@localhost/none").pool_size(3);
        let db = Database::from_pool(create_pool(&cfg).unwrap());
        assert_eq!(db.pool().status().max_size, 3);

        let clone = db.clone();
        db.close();
        assert!(clone.is_closed());
    }
}
