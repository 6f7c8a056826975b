diesel::table! {
    users (id) {
        id -> Int4,
        name -> Varchar,
        email -> Varchar,
        password -> Varchar,
    }
}

diesel::table! {
    properties (id) {
        id -> Int4,
        owner_id -> Int4,
        title -> Varchar,
        description -> Text,
        thumbnail_photo_url -> Varchar,
        cover_photo_url -> Varchar,
        cost_per_night -> Int4,
        parking_spaces -> Int4,
        number_of_bathrooms -> Int4,
        number_of_bedrooms -> Int4,
        country -> Varchar,
        street -> Varchar,
        city -> Varchar,
        province -> Varchar,
        post_code -> Varchar,
    }
}

diesel::table! {
    reservations (id) {
        id -> Int4,
        start_date -> Date,
        end_date -> Date,
        property_id -> Int4,
        guest_id -> Int4,
    }
}

diesel::table! {
    property_reviews (id) {
        id -> Int4,
        guest_id -> Int4,
        property_id -> Int4,
        reservation_id -> Int4,
        rating -> Int2,
        message -> Nullable<Text>,
    }
}

diesel::joinable!(properties -> users (owner_id));
diesel::joinable!(reservations -> properties (property_id));
diesel::joinable!(property_reviews -> properties (property_id));
diesel::joinable!(property_reviews -> reservations (reservation_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    properties,
    reservations,
    property_reviews,
);
