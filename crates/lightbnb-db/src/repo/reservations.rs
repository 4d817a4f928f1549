use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::ReservationListing;
use crate::sql::{sql, validate_limit};

/// Rows returned when the caller does not pass a limit.
pub const DEFAULT_RESERVATION_LIMIT: i64 = 10;

const PAST_RESERVATIONS: &str = "SELECT properties.*, \
reservations.id AS reservation_id, reservations.guest_id, \
reservations.start_date, reservations.end_date, \
avg(property_reviews.rating)::float8 AS average_rating \
FROM reservations \
JOIN properties ON reservations.property_id = properties.id \
LEFT JOIN property_reviews ON properties.id = property_reviews.property_id \
WHERE reservations.guest_id = ";

/// A guest's past reservations (ended before today), earliest first.
pub async fn get_all_reservations(
    conn: &impl GenericClient,
    guest_id: i32,
    limit: Option<i64>,
) -> DbResult<Vec<ReservationListing>> {
    let limit = validate_limit(limit.unwrap_or(DEFAULT_RESERVATION_LIMIT))?;

    let mut q = sql(PAST_RESERVATIONS);
    q.push_bind(guest_id)
        .push(
            " AND reservations.end_date < now()::date \
GROUP BY properties.id, reservations.id \
ORDER BY reservations.start_date ASC",
        )
        .limit(limit)
        .tag("reservations.past_for_guest");
    q.fetch_all_as(conn).await
}
