//! PostgreSQL-backed `HistoryRepository` implementation using Diesel.

use async_trait::async_trait;
use calorie_model::Gender;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{HistoryPersistenceError, HistoryRepository};
use crate::domain::{HistoryEntry, Measurements, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{HistoryRow, NewHistoryRow};
use super::pool::{DbPool, PoolError};
use super::schema::prediction_history;

/// Diesel-backed implementation of the history repository port.
#[derive(Clone)]
pub struct DieselHistoryRepository {
    pool: DbPool,
}

impl DieselHistoryRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> HistoryPersistenceError {
    map_basic_pool_error(error, HistoryPersistenceError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> HistoryPersistenceError {
    map_basic_diesel_error(
        error,
        HistoryPersistenceError::query,
        HistoryPersistenceError::connection,
    )
}

fn row_to_entry(row: HistoryRow) -> Result<HistoryEntry, HistoryPersistenceError> {
    let gender = Gender::parse(&row.gender).map_err(|err| {
        HistoryPersistenceError::query(format!("invalid gender in database: {err}"))
    })?;
    Ok(HistoryEntry {
        id: row.id,
        user_id: UserId::from_uuid(row.user_id),
        gender,
        measurements: Measurements {
            age: row.age,
            height: row.height,
            weight: row.weight,
            duration: row.duration,
            heart_rate: row.heart_rate,
            body_temp: row.body_temp,
        },
        predicted_calories: row.predicted_calories,
        created_at: row.created_at,
    })
}

#[async_trait]
impl HistoryRepository for DieselHistoryRepository {
    async fn append(&self, entry: &HistoryEntry) -> Result<(), HistoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let m = &entry.measurements;
        let row = NewHistoryRow {
            id: entry.id,
            user_id: *entry.user_id.as_uuid(),
            gender: entry.gender.as_str(),
            age: m.age,
            height: m.height,
            weight: m.weight,
            duration: m.duration,
            heart_rate: m.heart_rate,
            body_temp: m.body_temp,
            predicted_calories: entry.predicted_calories,
            created_at: entry.created_at,
        };
        diesel::insert_into(prediction_history::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn list_for(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<HistoryEntry>, HistoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<HistoryRow> = prediction_history::table
            .filter(prediction_history::user_id.eq(user_id.as_uuid()))
            .order((
                prediction_history::created_at.desc(),
                prediction_history::id.desc(),
            ))
            .select(HistoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_entry).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn row(gender: &str) -> HistoryRow {
        HistoryRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            gender: gender.to_owned(),
            age: 28.0,
            height: 175.0,
            weight: 72.0,
            duration: 30.0,
            heart_rate: 105.0,
            body_temp: 40.5,
            predicted_calories: 187.46,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn rows_become_entries() {
        let source = row("male");
        let entry = row_to_entry(source.clone()).expect("valid row");
        assert_eq!(entry.id, source.id);
        assert_eq!(entry.user_id.as_uuid(), &source.user_id);
        assert_eq!(entry.gender, Gender::Male);
        assert_eq!(entry.measurements.body_temp, 40.5);
        assert_eq!(entry.predicted_calories, 187.46);
    }

    #[rstest]
    fn unknown_gender_is_a_query_error() {
        let err = row_to_entry(row("unknown")).expect_err("corrupt row");
        assert!(matches!(err, HistoryPersistenceError::Query { .. }));
    }
}
