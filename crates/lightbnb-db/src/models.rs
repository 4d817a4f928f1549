//! Row types for the `users`, `properties` and `reservations` tables.

use crate::error::DbResult;
use crate::row::{FromRow, RowExt};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A row of `users`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl FromRow for User {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            email: row.try_get_column("email")?,
            password: row.try_get_column("password")?,
        })
    }
}

/// Input for inserting a user. `password` is stored as given.
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// A row of `properties`. `cost_per_night` is in cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub active: bool,
}

impl FromRow for Property {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            owner_id: row.try_get_column("owner_id")?,
            title: row.try_get_column("title")?,
            description: row.try_get_column("description")?,
            thumbnail_photo_url: row.try_get_column("thumbnail_photo_url")?,
            cover_photo_url: row.try_get_column("cover_photo_url")?,
            cost_per_night: row.try_get_column("cost_per_night")?,
            parking_spaces: row.try_get_column("parking_spaces")?,
            number_of_bathrooms: row.try_get_column("number_of_bathrooms")?,
            number_of_bedrooms: row.try_get_column("number_of_bedrooms")?,
            country: row.try_get_column("country")?,
            street: row.try_get_column("street")?,
            city: row.try_get_column("city")?,
            province: row.try_get_column("province")?,
            post_code: row.try_get_column("post_code")?,
            active: row.try_get_column("active")?,
        })
    }
}

/// Input for inserting a property.
///
/// `cost_per_night` is in cents, the same unit the column stores.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProperty {
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
}

/// A property together with the mean of its review ratings.
///
/// `average_rating` is `None` for a property nobody has reviewed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyListing {
    #[serde(flatten)]
    pub property: Property,
    pub average_rating: Option<f64>,
}

impl FromRow for PropertyListing {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            property: Property::from_row(row)?,
            average_rating: row.try_get_column("average_rating")?,
        })
    }
}

/// A row of `reservations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: i32,
    pub guest_id: i32,
    pub property_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A past reservation with the reserved property and its average rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReservationListing {
    pub reservation: Reservation,
    pub property: Property,
    pub average_rating: Option<f64>,
}

impl FromRow for ReservationListing {
    fn from_row(row: &Row) -> DbResult<Self> {
        let property = Property::from_row(row)?;
        Ok(Self {
            reservation: Reservation {
                id: row.try_get_column("reservation_id")?,
                guest_id: row.try_get_column("guest_id")?,
                property_id: property.id,
                start_date: row.try_get_column("start_date")?,
                end_date: row.try_get_column("end_date")?,
            },
            property,
            average_rating: row.try_get_column("average_rating")?,
        })
    }
}
