//! Dynamic SQL builder.
//!
//! Use `Sql` when a statement has to be *composed* from optional pieces
//! without manually tracking placeholder indices.
//!
//! # Example
//!
//! ```ignore
//! use lightbnb_db::sql;
//!
//! let mut q = sql("SELECT id, name FROM users WHERE 1=1");
//! if let Some(email) = email {
//!     q.push(" AND email = ").push_bind(email);
//! }
//! q.push(" ORDER BY id");
//!
//! let users: Vec<User> = q.fetch_all_as(&db).await?;
//! ```

mod builder;


pub use builder::Sql;

use crate::error::{DbError, DbResult};

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

/// Check a row limit before it is bound: it must be at least 1.
pub fn validate_limit(limit: i64) -> DbResult<i64> {
    if limit < 1 {
        return Err(DbError::validation(format!("limit must be >= 1, got {limit}")));
    }
    Ok(limit)
}
