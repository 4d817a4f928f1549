//! Data-access operations.
//!
//! Every function takes the client to run against, so the same code works
//! with a [`Database`](crate::Database), a single pooled connection, or a
//! plain `tokio_postgres::Client`. Nothing is swallowed: a missing row is
//! `Ok(None)` or an empty `Vec`, a failed statement is an `Err`.

mod properties;
mod reservations;
mod users;


pub use properties::{add_property, get_all_properties};
pub use reservations::{DEFAULT_RESERVATION_LIMIT, get_all_reservations};
pub use users::{add_user, get_user_with_email, get_user_with_id};
