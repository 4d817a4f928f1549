use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use lightbnb_db::{PropertyListing, ReservationListing, User};
use serde::Serialize;

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|t| Cell::new(t).add_attribute(Attribute::Bold).fg(Color::Cyan))
        .collect()
}

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(titles));
    table
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `$123.45` from cents.
pub fn format_cents(cents: i32) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

pub fn format_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| "-".to_string(), |r| format!("{r:.2}"))
}

pub fn print_users(users: &[User], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(users);
    }
    let mut table = new_table(&["ID", "Name", "Email"]);
    for u in users {
        table.add_row(vec![
            Cell::new(u.id),
            Cell::new(&u.name),
            Cell::new(&u.email),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn print_properties(listings: &[PropertyListing], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(listings);
    }
    let mut table = new_table(&["ID", "Title", "City", "Per night", "Rating", "Owner"]);
    for l in listings {
        let p = &l.property;
        table.add_row(vec![
            Cell::new(p.id),
            Cell::new(&p.title),
            Cell::new(&p.city),
            Cell::new(format_cents(p.cost_per_night)),
            Cell::new(format_rating(l.average_rating)),
            Cell::new(p.owner_id),
        ]);
    }
    println!("{table}");
    println!("{} propert{}", listings.len(), if listings.len() == 1 { "y" } else { "ies" });
    Ok(())
}

pub fn print_reservations(reservations: &[ReservationListing], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(reservations);
    }
    let mut table = new_table(&["ID", "Property", "City", "Start", "End", "Per night", "Rating"]);
    for r in reservations {
        table.add_row(vec![
            Cell::new(r.reservation.id),
            Cell::new(&r.property.title),
            Cell::new(&r.property.city),
            Cell::new(r.reservation.start_date),
            Cell::new(r.reservation.end_date),
            Cell::new(format_cents(r.property.cost_per_night)),
            Cell::new(format_rating(r.average_rating)),
        ]);
    }
    println!("{table}");
    Ok(())
}
