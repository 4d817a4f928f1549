use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::{NewUser, User};
use crate::sql::sql;

/// Look up a user by exact (case-sensitive) email.
pub async fn get_user_with_email(conn: &impl GenericClient, email: &str) -> DbResult<Option<User>> {
    sql("SELECT * FROM users WHERE email = ")
        .bind(email.to_string())
        .tagged("users.by_email")
        .fetch_opt_as(conn)
        .await
}

/// Look up a user by id.
pub async fn get_user_with_id(conn: &impl GenericClient, id: i32) -> DbResult<Option<User>> {
    sql("SELECT * FROM users WHERE id = ")
        .bind(id)
        .tagged("users.by_id")
        .fetch_opt_as(conn)
        .await
}

/// Insert a user and return the stored row.
///
/// Email uniqueness is enforced by the database only; a duplicate surfaces as
/// [`DbError::UniqueViolation`](crate::DbError::UniqueViolation).
pub async fn add_user(conn: &impl GenericClient, user: &NewUser) -> DbResult<User> {
    let mut q = sql("INSERT INTO users (name, email, password) VALUES (");
    q.push_bind(user.name.clone())
        .push(", ")
        .push_bind(user.email.clone())
        .push(", ")
        .push_bind(user.password.clone())
        .push(") RETURNING *")
        .tag("users.insert");
    q.fetch_one_as(conn).await
}
