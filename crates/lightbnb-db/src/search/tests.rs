use super::*;

fn compose(filter: &PropertyFilter) -> PropertySearch {
    PropertySearch::new(filter).unwrap()
}

/// Placeholder ordinals in order of appearance.
fn placeholders(sql: &str) -> Vec<usize> {
    let mut out = Vec::new();
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            out.push(sql[start..end].parse().unwrap());
            i = end;
        } else {
            i += 1;
        }
    }
    out
}

fn debug_params(search: &PropertySearch) -> Vec<String> {
    search
        .params_ref()
        .iter()
        .map(|p| format!("{p:?}"))
        .collect()
}

fn assert_contiguous(search: &PropertySearch) {
    let ords = placeholders(&search.to_sql());
    let expected: Vec<usize> = (1..=search.param_count()).collect();
    assert_eq!(ords, expected, "sql: {}", search.to_sql());
}

#[test]
fn empty_filter_has_no_where_or_having() {
    let s = compose(&PropertyFilter::new());
    let sql = s.to_sql();

    assert!(!sql.contains("WHERE"));
    assert!(!sql.contains("HAVING"));
    assert!(
        sql.ends_with(" GROUP BY properties.id ORDER BY properties.cost_per_night ASC LIMIT $1")
    );
    assert_eq!(debug_params(&s), vec!["10"]);
}

#[test]
fn city_only() {
    let s = compose(&PropertyFilter::new().city("van").limit(5));
    let sql = s.to_sql();

    assert!(sql.contains(" WHERE properties.city LIKE $1 GROUP BY"));
    assert!(sql.ends_with("LIMIT $2"));
    assert_eq!(debug_params(&s), vec!["\"%van%\"", "5"]);
}

#[test]
fn owner_only_uses_where_not_and() {
    let s = compose(&PropertyFilter::new().owner_id(7));
    let sql = s.to_sql();

    assert_eq!(sql.matches("WHERE").count(), 1);
    assert!(sql.contains(" WHERE properties.owner_id = $1"));
    assert!(!sql.contains(" AND properties.owner_id"));
    assert_contiguous(&s);
}

#[test]
fn price_only_uses_where_and_binds_cents() {
    let s = compose(&PropertyFilter::new().price_range(50, 150));
    let sql = s.to_sql();

    assert!(sql.contains(
        " WHERE properties.cost_per_night >= $1 AND properties.cost_per_night <= $2"
    ));
    assert_eq!(debug_params(&s), vec!["5000", "15000", "10"]);
}

#[test]
fn one_sided_price_bound_is_ignored() {
    let mut filter = PropertyFilter::new();
    filter.minimum_price_per_night = Some(50);
    let s = compose(&filter);

    assert!(!s.to_sql().contains("WHERE"));
    assert_eq!(s.param_count(), 1);
}

#[test]
fn later_filters_use_and() {
    let s = compose(&PropertyFilter::new().city("Van").owner_id(3).price_range(10, 20));
    let sql = s.to_sql();

    assert_eq!(sql.matches("WHERE").count(), 1);
    assert!(sql.contains(
        " WHERE properties.city LIKE $1 AND properties.owner_id = $2 \
AND properties.cost_per_night >= $3 AND properties.cost_per_night <= $4 GROUP BY"
    ));
    assert_eq!(
        debug_params(&s),
        vec!["\"%Van%\"", "3", "1000", "2000", "10"]
    );
    assert_contiguous(&s);
}

#[test]
fn owner_and_price_without_city() {
    let s = compose(&PropertyFilter::new().owner_id(3).price_range(10, 20));
    let sql = s.to_sql();

    assert!(sql.contains(" WHERE properties.owner_id = $1 AND properties.cost_per_night >= $2"));
    assert_contiguous(&s);
}

#[test]
fn minimum_rating_goes_in_having_after_group_by() {
    let s = compose(&PropertyFilter::new().minimum_rating(4.0));
    let sql = s.to_sql();

    let group_by = sql.find("GROUP BY").unwrap();
    let having = sql.find("HAVING").unwrap();
    assert!(having > group_by);
    assert!(!sql.contains("WHERE"));
    assert!(sql.contains("HAVING avg(property_reviews.rating)::float8 >= $1"));
    assert_eq!(debug_params(&s), vec!["4.0", "10"]);
}

#[test]
fn all_filters_keep_limit_last() {
    let s = compose(
        &PropertyFilter::new()
            .city("Van")
            .owner_id(1)
            .price_range(1, 2)
            .minimum_rating(3.5)
            .limit(20),
    );
    let sql = s.to_sql();
    let ords = placeholders(&sql);

    assert_eq!(s.param_count(), 6);
    assert_eq!(ords.last(), Some(&6));
    assert!(sql.ends_with("ORDER BY properties.cost_per_night ASC LIMIT $6"));
    assert!(sql.find("WHERE").unwrap() < sql.find("GROUP BY").unwrap());
    assert!(sql.find("GROUP BY").unwrap() < sql.find("HAVING").unwrap());
    assert_contiguous(&s);
}

#[test]
fn non_positive_limit_is_rejected() {
    let err = PropertySearch::new(&PropertyFilter::new().limit(0)).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
}

#[test]
fn nan_rating_is_rejected() {
    let err = PropertySearch::new(&PropertyFilter::new().minimum_rating(f64::NAN)).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
}

#[test]
fn price_overflow_is_rejected() {
    let err = PropertySearch::new(&PropertyFilter::new().price_range(0, i32::MAX)).unwrap_err();
    assert!(matches!(err, DbError::Validation(_)));
}

#[test]
fn every_filter_combination_is_well_formed() {
    for mask in 0u8..16 {
        let mut filter = PropertyFilter::new();
        if mask & 1 != 0 {
            filter = filter.city("a");
        }
        if mask & 2 != 0 {
            filter = filter.owner_id(1);
        }
        if mask & 4 != 0 {
            filter = filter.price_range(1, 2);
        }
        if mask & 8 != 0 {
            filter = filter.minimum_rating(1.0);
        }

        let s = compose(&filter);
        let sql = s.to_sql();
        let row_filters = (mask & 7).count_ones();

        assert_eq!(sql.matches(" WHERE ").count(), usize::from(row_filters > 0), "{sql}");
        assert!(!sql.contains("WHERE AND"), "{sql}");
        assert_eq!(sql.contains(" HAVING "), mask & 8 != 0, "{sql}");
        assert_contiguous(&s);
    }
}

#[test]
fn filter_deserializes_from_query_like_json() {
    let filter: PropertyFilter = serde_json::from_str(
        r#"{"city":"Van","minimum_price_per_night":50,"maximum_price_per_night":150}"#,
    )
    .unwrap();
    assert_eq!(filter, PropertyFilter::new().city("Van").price_range(50, 150));
    assert_eq!(filter.effective_limit(), DEFAULT_LIMIT);
}
