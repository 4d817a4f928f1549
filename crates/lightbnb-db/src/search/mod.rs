//! Property search: composes the listing query from an optional filter.
//!
//! Row filters (`city`, `owner_id`, price range) become `WHERE`/`AND`
//! conditions, `minimum_rating` becomes a `HAVING` condition on the
//! aggregated rating, and the statement always ends with
//! `ORDER BY properties.cost_per_night ASC LIMIT $n`.
//!
//! ```ignore
//! use lightbnb_db::{PropertyFilter, PropertySearch};
//!
//! let filter = PropertyFilter::new().city("Vancouver").price_range(50, 150).limit(5);
//! let listings = PropertySearch::new(&filter)?.fetch_all(&db).await?;
//! ```

#[cfg(test)]
mod tests;

use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use crate::models::PropertyListing;
use crate::sql::{Sql, validate_limit};
use serde::Deserialize;
use tokio_postgres::types::ToSql;

/// Rows returned when the filter does not set a limit.
pub const DEFAULT_LIMIT: i64 = 10;

/// Prices are stored in cents.
const CENTS_PER_DOLLAR: i32 = 100;

const BASE_SELECT: &str = "SELECT properties.*, avg(property_reviews.rating)::float8 AS average_rating \
FROM properties \
LEFT JOIN property_reviews ON properties.id = property_reviews.property_id";

/// Optional constraints narrowing a property listing.
///
/// Prices are whole dollars; they are converted to cents before binding.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PropertyFilter {
    /// Case-sensitive substring of `properties.city`.
    pub city: Option<String>,
    pub owner_id: Option<i32>,
    /// Only applied together with `maximum_price_per_night`.
    pub minimum_price_per_night: Option<i32>,
    /// Only applied together with `minimum_price_per_night`.
    pub maximum_price_per_night: Option<i32>,
    /// Lower bound on the average review rating.
    pub minimum_rating: Option<f64>,
    /// Defaults to [`DEFAULT_LIMIT`].
    pub limit: Option<i64>,
}

impl PropertyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn owner_id(mut self, owner_id: i32) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Set both price bounds, in dollars.
    pub fn price_range(mut self, minimum: i32, maximum: i32) -> Self {
        self.minimum_price_per_night = Some(minimum);
        self.maximum_price_per_night = Some(maximum);
        self
    }

    pub fn minimum_rating(mut self, rating: f64) -> Self {
        self.minimum_rating = Some(rating);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The effective row limit.
    pub fn effective_limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Both price bounds in cents, when both are set.
    fn price_range_cents(&self) -> DbResult<Option<(i32, i32)>> {
        match (self.minimum_price_per_night, self.maximum_price_per_night) {
            (Some(min), Some(max)) => Ok(Some((dollars_to_cents(min)?, dollars_to_cents(max)?))),
            (None, None) => Ok(None),
            _ => {
                tracing::debug!(
                    target: "lightbnb.search",
                    "ignoring one-sided price bound; both minimum and maximum are required"
                );
                Ok(None)
            }
        }
    }

    /// Row-level conditions in application order.
    fn row_conditions(&self) -> DbResult<Vec<Sql>> {
        let mut conditions = Vec::new();

        if let Some(city) = &self.city {
            conditions.push(Sql::new("properties.city LIKE ").bind(format!("%{city}%")));
        }

        if let Some(owner_id) = self.owner_id {
            conditions.push(Sql::new("properties.owner_id = ").bind(owner_id));
        }

        if let Some((min, max)) = self.price_range_cents()? {
            let mut range = Sql::new("properties.cost_per_night >= ");
            range
                .push_bind(min)
                .push(" AND properties.cost_per_night <= ")
                .push_bind(max);
            conditions.push(range);
        }

        Ok(conditions)
    }

    fn validate(&self) -> DbResult<()> {
        validate_limit(self.effective_limit())?;
        if let Some(rating) = self.minimum_rating
            && !rating.is_finite()
        {
            return Err(DbError::validation(format!(
                "minimum_rating must be a finite number, got {rating}"
            )));
        }
        Ok(())
    }
}

fn dollars_to_cents(dollars: i32) -> DbResult<i32> {
    dollars
        .checked_mul(CENTS_PER_DOLLAR)
        .ok_or_else(|| DbError::validation(format!("price {dollars} is out of range")))
}

/// A composed property-search statement.
#[derive(Debug)]
pub struct PropertySearch {
    sql: Sql,
}

impl PropertySearch {
    /// Compose the statement for `filter`.
    ///
    /// Fails with [`DbError::Validation`] for a non-positive limit, a
    /// non-finite rating, or a price that overflows when converted to cents.
    pub fn new(filter: &PropertyFilter) -> DbResult<Self> {
        filter.validate()?;

        let mut sql = Sql::new(BASE_SELECT);
        sql.tag("properties.search");

        let mut has_where = false;
        for condition in filter.row_conditions()? {
            sql.push(if has_where { " AND " } else { " WHERE " });
            has_where = true;
            sql.push_sql(condition);
        }

        sql.push(" GROUP BY properties.id");

        if let Some(rating) = filter.minimum_rating {
            sql.push(" HAVING avg(property_reviews.rating)::float8 >= ")
                .push_bind(rating);
        }

        sql.push(" ORDER BY properties.cost_per_night ASC");
        sql.limit(filter.effective_limit());

        Ok(Self { sql })
    }

    /// The statement text with `$1..$N` placeholders.
    pub fn to_sql(&self) -> String {
        self.sql.to_sql()
    }

    /// Number of bound values, equal to the highest placeholder ordinal.
    pub fn param_count(&self) -> usize {
        self.sql.param_count()
    }

    /// Bound values in placeholder order.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.sql.params_ref()
    }

    /// Run the search.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> DbResult<Vec<PropertyListing>> {
        self.sql.fetch_all_as(conn).await
    }
}
