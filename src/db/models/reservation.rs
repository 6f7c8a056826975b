use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::sql_types::{Date, Integer, Nullable, Numeric};
use serde::Serialize;

use crate::db::models::property::Property;
use crate::db::postgres::schema::reservations;

#[derive(Queryable, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = reservations)]
pub struct Reservation {
    pub id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub property_id: i32,
    pub guest_id: i32,
}

/// A finished stay, with the reserved property and its average review score.
#[derive(QueryableByName, Debug, Clone, Serialize)]
pub struct PastReservation {
    #[diesel(sql_type = Integer)]
    pub reservation_id: i32,
    #[diesel(sql_type = Integer)]
    pub guest_id: i32,
    #[diesel(sql_type = Date)]
    pub start_date: NaiveDate,
    #[diesel(sql_type = Date)]
    pub end_date: NaiveDate,
    #[diesel(embed)]
    pub property: Property,
    #[diesel(sql_type = Nullable<Numeric>)]
    pub average_rating: Option<BigDecimal>,
}
