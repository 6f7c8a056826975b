use crate::db::error::{DbError, DbResult};
use crate::db::models::property::{to_cents, NewProperty, Property, PropertyFilters, PropertyListing};
use crate::db::postgres::schema::properties;
use crate::db::repositories::repositories_utils::{run_blocking, BindValue, ParamQuery};
use crate::db::repositories::{DBPool, DEFAULT_LIMIT};
use diesel::pg::Pg;
use diesel::prelude::*;
use std::sync::Arc;
use tracing::{debug, error};

const SELECT_LISTINGS: &str = r#"
SELECT properties.*, avg(property_reviews.rating) AS average_rating
FROM properties
JOIN property_reviews ON properties.id = property_reviews.property_id
WHERE 1 = 1
"#;

/// Builds the listing search for `filters`.
///
/// Every filter is a WHERE clause on the joined review rows, so
/// `minimum_rating` drops individual reviews below the threshold before the
/// average is taken. Results are cheapest first.
pub fn search_query(filters: &PropertyFilters, limit: i64) -> ParamQuery {
    let mut query = ParamQuery::new(SELECT_LISTINGS);

    if let Some(city) = filters.city() {
        query = query.param("AND properties.city LIKE", BindValue::Text(format!("%{}%", city)));
    }
    if let Some(owner_id) = filters.owner_id() {
        query = query.param("AND properties.owner_id =", BindValue::Integer(owner_id));
    }
    if let Some(min_price) = filters.minimum_price_per_night() {
        query = query.param(
            "AND properties.cost_per_night >=",
            BindValue::Integer(to_cents(min_price)),
        );
    }
    if let Some(max_price) = filters.maximum_price_per_night() {
        query = query.param(
            "AND properties.cost_per_night <=",
            BindValue::Integer(to_cents(max_price)),
        );
    }
    if let Some(min_rating) = filters.minimum_rating() {
        query = query.param("AND property_reviews.rating >=", BindValue::Double(min_rating));
    }

    query
        .sql("GROUP BY properties.id\n")
        .sql("ORDER BY properties.cost_per_night\n")
        .param("LIMIT", BindValue::BigInt(limit))
}

#[derive(Clone)]
pub struct PropertyRepository {
    pool: Arc<DBPool>,
}

impl PropertyRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        PropertyRepository { pool }
    }

    /// Reviewed properties matching every supplied filter, cheapest first,
    /// at most `limit` rows (default 10).
    pub async fn get_all_properties(
        &self,
        filters: &PropertyFilters,
        limit: Option<i64>,
    ) -> DbResult<Vec<PropertyListing>> {
        let filters = filters.clone();
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        run_blocking(self.pool.clone(), move |conn| {
            let query = search_query(&filters, limit).into_query();
            debug!(query = %diesel::debug_query::<Pg, _>(&query), "Searching properties");
            query.load::<PropertyListing>(conn).map_err(|e| {
                error!(filters = ?filters, limit, error = ?e, "Failed to search properties");
                DbError::from(e)
            })
        })
        .await
    }

    /// Inserts a property and returns the stored row, including its id.
    pub async fn add_property(&self, new_property: NewProperty) -> DbResult<Property> {
        run_blocking(self.pool.clone(), move |conn| {
            diesel::insert_into(properties::table)
                .values(&new_property)
                .returning(Property::as_returning())
                .get_result(conn)
                .map_err(|e| {
                    error!(property = ?new_property, error = ?e, "Failed to insert Property");
                    DbError::from(e)
                })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::debug_query;

    fn render(filters: &PropertyFilters, limit: i64) -> (String, String) {
        let query = search_query(filters, limit).into_query();
        let rendered = debug_query::<Pg, _>(&query).to_string();
        let (sql, binds) = rendered
            .split_once(" -- binds: ")
            .expect("debug output carries binds");
        (sql.to_string(), binds.to_string())
    }

    #[test]
    fn no_filters_only_binds_the_limit() {
        let (sql, binds) = render(&PropertyFilters::default(), 5);

        assert!(sql.contains("WHERE 1 = 1\nGROUP BY properties.id\nORDER BY properties.cost_per_night\nLIMIT $1\n"));
        assert_eq!(binds, "[5]");
    }

    #[test]
    fn every_filter_gets_the_next_placeholder() {
        let filters = PropertyFilters {
            city: Some("Vancouver".to_string()),
            owner_id: Some(42),
            minimum_price_per_night: Some(50.0),
            maximum_price_per_night: Some(100.0),
            minimum_rating: Some(4.0),
        };
        let (sql, binds) = render(&filters, 10);

        assert!(sql.contains("AND properties.city LIKE $1\n"));
        assert!(sql.contains("AND properties.owner_id = $2\n"));
        assert!(sql.contains("AND properties.cost_per_night >= $3\n"));
        assert!(sql.contains("AND properties.cost_per_night <= $4\n"));
        assert!(sql.contains("AND property_reviews.rating >= $5\nGROUP BY properties.id\n"));
        assert!(sql.ends_with("LIMIT $6\n"));
        assert_eq!(binds, "[\"%Vancouver%\", 42, 5000, 10000, 4.0, 10]");
    }

    #[test]
    fn skipped_filters_do_not_leave_gaps() {
        let filters = PropertyFilters {
            maximum_price_per_night: Some(80.0),
            minimum_rating: Some(3.5),
            ..Default::default()
        };
        let (sql, binds) = render(&filters, 3);

        assert!(sql.contains("AND properties.cost_per_night <= $1\n"));
        assert!(sql.contains("AND property_reviews.rating >= $2\nGROUP BY properties.id\n"));
        assert!(sql.ends_with("LIMIT $3\n"));
        assert!(!sql.contains("city"));
        assert!(!sql.contains("owner_id ="));
        assert_eq!(binds, "[8000, 3.5, 3]");
    }

    #[test]
    fn owner_filter_is_an_exact_match() {
        let filters = PropertyFilters {
            owner_id: Some(7),
            ..Default::default()
        };
        let (sql, _) = render(&filters, 10);

        assert!(sql.contains("AND properties.owner_id = $1\n"));
        assert!(!sql.contains("owner_id LIKE"));
    }

    #[test]
    fn zero_filters_are_ignored() {
        let filters = PropertyFilters {
            owner_id: Some(0),
            minimum_price_per_night: Some(0.0),
            maximum_price_per_night: Some(0.0),
            minimum_rating: Some(0.0),
            ..Default::default()
        };
        let (sql, binds) = render(&filters, 10);

        assert!(sql.contains("WHERE 1 = 1\nGROUP BY properties.id\n"));
        assert_eq!(binds, "[10]");
    }

    #[test]
    fn city_is_bound_untrimmed() {
        let filters = PropertyFilters {
            city: Some(" Vancouver ".to_string()),
            ..Default::default()
        };
        let (_, binds) = render(&filters, 10);

        assert_eq!(binds, "[\"% Vancouver %\", 10]");
    }

    #[test]
    fn blank_city_is_ignored() {
        let filters = PropertyFilters {
            city: Some(String::new()),
            ..Default::default()
        };
        let (sql, binds) = render(&filters, 10);

        assert!(!sql.contains("LIKE"));
        assert_eq!(binds, "[10]");
    }
}
