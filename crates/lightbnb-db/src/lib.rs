//! # lightbnb-db
//!
//! PostgreSQL data-access layer for the LightBnB property-rental app.
//!
//! - **Typed results**: every operation returns [`DbResult`]; "no rows" and
//!   "query failed" are never confused
//! - **Dynamic search**: [`PropertySearch`] composes the listing query from an
//!   optional [`PropertyFilter`] with correctly numbered placeholders
//! - **Injected pool**: open a [`Database`] once at startup and pass it to the
//!   operations in [`repo`]
//!
//! ```ignore
//! use lightbnb_db::{Database, DbConfig, PropertyFilter, repo};
//!
//! let db = Database::connect(&DbConfig::from_env()?)?;
//!
//! let user = repo::get_user_with_email(&db, "tristanjacobs@gmail.com").await?;
//! let listings = repo::get_all_properties(
//!     &db,
//!     &PropertyFilter::new().city("Vancouver").minimum_rating(4.0),
//! )
//! .await?;
//!
//! db.close();
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod row;
pub mod search;
pub mod sql;

pub use client::GenericClient;
pub use config::{ConnectionTarget, DbConfig};
pub use error::{DbError, DbResult};
pub use models::{
    NewProperty, NewUser, Property, PropertyListing, Reservation, ReservationListing, User,
};
pub use row::{FromRow, RowExt};
pub use search::{DEFAULT_LIMIT, PropertyFilter, PropertySearch};
pub use sql::{Sql, sql};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{Database, create_pool};
