//! Connection settings read from the environment.

use crate::error::{DbError, DbResult};
use std::time::Duration;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_DATABASE: &str = "lightbnb";
const DEFAULT_POOL_SIZE: usize = 16;

/// Where the connection target comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A full `postgres://` URL or key/value connection string.
    Url(String),
    /// Discrete connection parameters.
    Params {
        host: String,
        port: u16,
        database: String,
        user: String,
        password: Option<String>,
    },
}

impl std::fmt::Debug for ConnectionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(_) => f.write_str("Url(<redacted>)"),
            Self::Params {
                host,
                port,
                database,
                user,
                ..
            } => f
                .debug_struct("Params")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .finish_non_exhaustive(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub target: ConnectionTarget,
    /// Maximum number of pooled connections.
    pub pool_size: usize,
    /// How long a checkout may wait for a free connection.
    pub wait_timeout: Option<Duration>,
}

impl DbConfig {
    /// Configuration for a `postgres://` URL with default pool settings.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            target: ConnectionTarget::Url(url.into()),
            pool_size: DEFAULT_POOL_SIZE,
            wait_timeout: None,
        }
    }

    /// Set the maximum pool size.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    /// Set the checkout wait timeout.
    pub fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first, if present.
    ///
    /// - `DATABASE_URL` wins when set.
    /// - Otherwise `PGHOST`, `PGPORT`, `PGDATABASE`, `PGUSER` (required) and
    ///   `PGPASSWORD`.
    /// - `LIGHTBNB_POOL_SIZE` and `LIGHTBNB_POOL_TIMEOUT_MS` tune the pool.
    pub fn from_env() -> DbResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> DbResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let target = match get("DATABASE_URL") {
            Some(url) => ConnectionTarget::Url(url),
            None => {
                let port = match get("PGPORT") {
                    Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                        DbError::config(format!("PGPORT must be a port number, got {raw:?}"))
                    })?,
                    None => DEFAULT_PORT,
                };
                ConnectionTarget::Params {
                    host: get("PGHOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
                    port,
                    database: get("PGDATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                    user: get("PGUSER").ok_or_else(|| {
                        DbError::config("set DATABASE_URL, or PGUSER with the PG* variables")
                    })?,
                    password: get("PGPASSWORD"),
                }
            }
        };

        let pool_size = match get("LIGHTBNB_POOL_SIZE") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(DbError::config(format!(
                        "LIGHTBNB_POOL_SIZE must be a positive integer, got {raw:?}"
                    )));
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        let wait_timeout = match get("LIGHTBNB_POOL_TIMEOUT_MS") {
            Some(raw) => Some(Duration::from_millis(raw.trim().parse::<u64>().map_err(
                |_| {
                    DbError::config(format!(
                        "LIGHTBNB_POOL_TIMEOUT_MS must be milliseconds, got {raw:?}"
                    ))
                },
            )?)),
            None => None,
        };

        Ok(Self {
            target,
            pool_size,
            wait_timeout,
        })
    }

    /// Build the `tokio_postgres` connection config.
    pub fn to_pg_config(&self) -> DbResult<tokio_postgres::Config> {
        match &self.target {
            ConnectionTarget::Url(url) => url
                .parse()
                .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string())),
            ConnectionTarget::Params {
                host,
                port,
                database,
                user,
                password,
            } => {
                let mut cfg = tokio_postgres::Config::new();
                cfg.host(host).port(*port).dbname(database).user(user);
                if let Some(password) = password {
                    cfg.password(password);
                }
                Ok(cfg)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn database_url_takes_precedence() {
        let cfg = DbConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://u:p@db/lightbnb"),
            ("PGUSER", "ignored"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.target,
            ConnectionTarget::Url("postgres://u:p@db/lightbnb".into())
        );
        assert_eq!(cfg.pool_size, DEFAULT_POOL_SIZE);
    }

    #[test]
    fn discrete_params_with_defaults() {
        let cfg = DbConfig::from_lookup(lookup(&[("PGUSER", "vagrant")])).unwrap();
        assert_eq!(
            cfg.target,
            ConnectionTarget::Params {
                host: "localhost".into(),
                port: 5432,
                database: "lightbnb".into(),
                user: "vagrant".into(),
                password: None,
            }
        );
    }

    #[test]
    fn missing_user_is_a_config_error() {
        let err = DbConfig::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, DbError::Config(_)));
    }

    #[test]
    fn bad_port_and_pool_size_are_rejected() {
        assert!(DbConfig::from_lookup(lookup(&[("PGUSER", "u"), ("PGPORT", "http")])).is_err());
        assert!(
            DbConfig::from_lookup(lookup(&[("PGUSER", "u"), ("LIGHTBNB_POOL_SIZE", "0")]))
                .is_err()
        );
    }

    #[test]
    fn pool_tuning_is_read() {
        let cfg = DbConfig::from_lookup(lookup(&[
            ("PGUSER", "u"),
            ("LIGHTBNB_POOL_SIZE", "4"),
            ("LIGHTBNB_POOL_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(cfg.pool_size, 4);
        assert_eq!(cfg.wait_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn params_build_a_pg_config() {
        let cfg = DbConfig::from_lookup(lookup(&[
            ("PGUSER", "vagrant"),
            ("PGPASSWORD", "123"),
            ("PGDATABASE", "lbnb"),
        ]))
        .unwrap();
        let pg = cfg.to_pg_config().unwrap();
        assert_eq!(pg.get_user(), Some("vagrant"));
        assert_eq!(pg.get_dbname(), Some("lbnb"));
        assert_eq!(pg.get_ports(), &[5432]);
    }

    #[test]
    fn url_parse_errors_are_connection_errors() {
        let err = DbConfig::from_url("postgres://u@db:notaport/x").to_pg_config().unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn debug_redacts_url() {
        let cfg = DbConfig::from_url("postgres://u:secret@db/x");
        assert!(!format!("{cfg:?}").contains("secret"));
    }

    #[test]
    fn builders_set_pool_tuning() {
        let cfg = DbConfig::from_url("postgres://localhost/lightbnb")
            .pool_size(4)
            .wait_timeout(Duration::from_millis(250));
        assert_eq!(cfg.pool_size, 4);
        assert_eq!(cfg.wait_timeout, Some(Duration::from_millis(250)));

        let defaults = DbConfig::from_url("postgres://localhost/lightbnb");
        assert_eq!(defaults.pool_size, DEFAULT_POOL_SIZE);
        assert_eq!(defaults.wait_timeout, None);
    }
}
