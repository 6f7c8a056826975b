use bigdecimal::BigDecimal;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Numeric};
use serde::{Deserialize, Serialize};

use crate::db::postgres::schema::properties;

#[derive(Queryable, QueryableByName, Selectable, Identifiable, Debug, PartialEq, Clone, Serialize)]
#[diesel(table_name = properties)]
pub struct Property {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    /// Nightly price in cents.
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

#[derive(Insertable, Debug, Clone, PartialEq, Deserialize)]
#[diesel(table_name = properties)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
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
    pub owner_id: i32,
}

/// A property as shown in search results.
#[derive(QueryableByName, Debug, Clone, Serialize)]
pub struct PropertyListing {
    #[diesel(embed)]
    #[serde(flatten)]
    pub property: Property,
    #[diesel(sql_type = Nullable<Numeric>)]
    pub average_rating: Option<BigDecimal>,
}

/// Search criteria for property listings. Every field is optional and the
/// supplied ones are combined with AND.
///
/// Prices are in whole currency units; the stored `cost_per_night` is cents.
/// A blank city and zero-valued numbers count as absent, so unset form
/// fields never narrow the search.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PropertyFilters {
    pub city: Option<String>,
    pub owner_id: Option<i32>,
    pub minimum_price_per_night: Option<f64>,
    pub maximum_price_per_night: Option<f64>,
    pub minimum_rating: Option<f64>,
}

impl PropertyFilters {
    /// The city filter exactly as given, or `None` when it is absent or blank.
    pub fn city(&self) -> Option<&str> {
        self.city
            .as_deref()
            .filter(|city| !city.trim().is_empty())
    }

    pub fn owner_id(&self) -> Option<i32> {
        self.owner_id.filter(|id| *id != 0)
    }

    pub fn minimum_price_per_night(&self) -> Option<f64> {
        non_zero(self.minimum_price_per_night)
    }

    pub fn maximum_price_per_night(&self) -> Option<f64> {
        non_zero(self.maximum_price_per_night)
    }

    pub fn minimum_rating(&self) -> Option<f64> {
        non_zero(self.minimum_rating)
    }
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Converts a whole-unit price to the cents stored in `cost_per_night`.
pub fn to_cents(price: f64) -> i32 {
    (price * 100.0).round() as i32
}
