//! Internal Diesel row structs.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{prediction_history, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub gender: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable account record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub gender: Option<&'a str>,
    pub created_at: DateTime<Utc>,
}

/// Row read from `prediction_history`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prediction_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HistoryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gender: String,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    pub duration: f64,
    pub heart_rate: f64,
    pub body_temp: f64,
    pub predicted_calories: f64,
    pub created_at: DateTime<Utc>,
}

/// Insertable history record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prediction_history)]
pub(crate) struct NewHistoryRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub gender: &'a str,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    pub duration: f64,
    pub heart_rate: f64,
    pub body_temp: f64,
    pub predicted_calories: f64,
    pub created_at: DateTime<Utc>,
}
