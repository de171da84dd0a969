//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Location reference data keyed by postal code.
    locations (zip_code) {
        zip_code -> Int4,
        city -> Varchar,
        state -> Varchar,
        latitude -> Float8,
        longitude -> Float8,
    }
}

diesel::table! {
    /// Cars and their current position.
    cars (id) {
        id -> Int4,
        number_plate -> Varchar,
        current_location -> Int4,
        capacity -> Int4,
    }
}

diesel::table! {
    /// Cargo shipment requests.
    cargo (id) {
        id -> Int4,
        pickup_location -> Int4,
        delivery_location -> Int4,
        weight -> Int4,
        description -> Varchar,
    }
}

diesel::joinable!(cars -> locations (current_location));

diesel::allow_tables_to_appear_in_same_query!(cargo, cars, locations);
