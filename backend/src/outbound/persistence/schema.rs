//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Registered accounts.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login handle (max 50 characters).
        username -> Varchar,
        /// Unique contact address (max 100 characters).
        email -> Varchar,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// `male` or `female`, recorded on the first prediction.
        gender -> Nullable<Varchar>,
        /// Account creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only prediction history.
    prediction_history (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Gender label the prediction used.
        gender -> Varchar,
        /// Age in years.
        age -> Float8,
        /// Height in centimetres.
        height -> Float8,
        /// Weight in kilograms.
        weight -> Float8,
        /// Exercise duration in minutes.
        duration -> Float8,
        /// Heart rate in beats per minute.
        heart_rate -> Float8,
        /// Body temperature in degrees Celsius.
        body_temp -> Float8,
        /// Rounded model output.
        predicted_calories -> Float8,
        /// When the prediction was made.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(prediction_history -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(prediction_history, users);
