use crate::client::GenericClient;
use crate::error::DbResult;
use crate::models::{NewProperty, Property, PropertyListing};
use crate::search::{PropertyFilter, PropertySearch};
use crate::sql::sql;

/// List properties matching `filter`, cheapest first.
pub async fn get_all_properties(
    conn: &impl GenericClient,
    filter: &PropertyFilter,
) -> DbResult<Vec<PropertyListing>> {
    PropertySearch::new(filter)?.fetch_all(conn).await
}

/// Insert a property and return the stored row.
pub async fn add_property(conn: &impl GenericClient, property: &NewProperty) -> DbResult<Property> {
    let mut q = sql(
        "INSERT INTO properties (owner_id, title, description, thumbnail_photo_url, \
cover_photo_url, cost_per_night, parking_spaces, number_of_bathrooms, number_of_bedrooms, \
country, street, city, province, post_code) VALUES (",
    );
    q.push_bind(property.owner_id)
        .push(", ")
        .push_bind(property.title.clone())
        .push(", ")
        .push_bind(property.description.clone())
        .push(", ")
        .push_bind(property.thumbnail_photo_url.clone())
        .push(", ")
        .push_bind(property.cover_photo_url.clone())
        .push(", ")
        .push_bind(property.cost_per_night)
        .push(", ")
        .push_bind(property.parking_spaces)
        .push(", ")
        .push_bind(property.number_of_bathrooms)
        .push(", ")
        .push_bind(property.number_of_bedrooms)
        .push(", ")
        .push_bind(property.country.clone())
        .push(", ")
        .push_bind(property.street.clone())
        .push(", ")
        .push_bind(property.city.clone())
        .push(", ")
        .push_bind(property.province.clone())
        .push(", ")
        .push_bind(property.post_code.clone())
        .push(") RETURNING *")
        .tag("properties.insert");
    q.fetch_one_as(conn).await
}
