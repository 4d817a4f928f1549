//! Error types for lightbnb-db

use thiserror::Error;

/// Result type alias for data-access operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error (syntax errors, undefined columns, ...)
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// NOT NULL constraint violation
    #[error("Not null violation: {0}")]
    NotNullViolation(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Invalid input or an inconsistent statement
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or malformed configuration
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl DbError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is any kind of constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::UniqueViolation(_)
                | Self::ForeignKeyViolation(_)
                | Self::CheckViolation(_)
                | Self::NotNullViolation(_)
        )
    }

    /// Check if the database could not be reached
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Connection(_) => true,
            #[cfg(feature = "pool")]
            Self::Pool(_) => true,
            Self::Query(e) => e.is_closed(),
            _ => false,
        }
    }

    /// Parse a tokio_postgres error into a more specific DbError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let detail = format!("{}: {}", constraint, db_err.message());
            if let Some(classified) = Self::from_sqlstate(db_err.code().code(), detail) {
                return classified;
            }
        }
        Self::Query(err)
    }

    /// Map an integrity-constraint SQLSTATE to its variant.
    pub(crate) fn from_sqlstate(code: &str, detail: String) -> Option<Self> {
        match code {
            "23505" => Some(Self::UniqueViolation(detail)),
            "23503" => Some(Self::ForeignKeyViolation(detail)),
            "23514" => Some(Self::CheckViolation(detail)),
            "23502" => Some(Self::NotNullViolation(detail)),
            _ => None,
        }
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
