use crate::db::error::{DbError, DbResult};
use crate::db::models::reservation::PastReservation;
use crate::db::repositories::repositories_utils::run_blocking;
use crate::db::repositories::{DBPool, DEFAULT_LIMIT};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer};
use std::sync::Arc;
use tracing::{debug, error};

// reservations.id is aliased so the embedded property keeps `id`.
const PAST_RESERVATIONS: &str = r#"
SELECT
    reservations.id AS reservation_id,
    reservations.guest_id,
    reservations.start_date,
    reservations.end_date,
    properties.*,
    avg(property_reviews.rating) AS average_rating
FROM reservations
JOIN properties ON properties.id = reservations.property_id
JOIN property_reviews ON properties.id = property_reviews.property_id
WHERE reservations.guest_id = $1
AND reservations.end_date < CURRENT_DATE
GROUP BY properties.id, reservations.id
ORDER BY reservations.start_date
LIMIT $2
"#;

#[derive(Clone)]
pub struct ReservationRepository {
    pool: Arc<DBPool>,
}

impl ReservationRepository {
    pub fn new(pool: Arc<DBPool>) -> Self {
        ReservationRepository { pool }
    }

    /// Stays of `guest_id` that ended before today, earliest first, at most
    /// `limit` rows (default 10).
    pub async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: Option<i64>,
    ) -> DbResult<Vec<PastReservation>> {
        let limit = limit.unwrap_or(DEFAULT_LIMIT);
        debug!(guest_id, limit, "Fetching past reservations");
        run_blocking(self.pool.clone(), move |conn| {
            diesel::sql_query(PAST_RESERVATIONS)
                .bind::<Integer, _>(guest_id)
                .bind::<BigInt, _>(limit)
                .load::<PastReservation>(conn)
                .map_err(|e| {
                    error!(guest_id, limit, error = ?e, "Failed to fetch past reservations");
                    DbError::from(e)
                })
        })
        .await
    }
}
