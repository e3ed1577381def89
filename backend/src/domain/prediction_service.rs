//! Prediction domain service.
//!
//! Implements [`PredictionCommand`] and [`HistoryQuery`]. A prediction is
//! validated in full before anything is written: gender first (only when the
//! profile has none), then the six measurements in order.

use std::sync::Arc;

use async_trait::async_trait;
use calorie_model::{Gender, round_to_hundredths};
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::account_service::map_user_repository_error;
use crate::domain::ports::{
    CalorieEstimator, HistoryPersistenceError, HistoryQuery, HistoryRepository, PredictionCommand,
    PredictionRequest, UserRepository,
};
use crate::domain::{
    Error, HistoryEntry, MeasurementError, Measurements, Prediction, PredictionOverview, User,
    UserId,
};

fn map_history_error(error: HistoryPersistenceError) -> Error {
    match error {
        HistoryPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("history repository unavailable: {message}"))
        }
        HistoryPersistenceError::Query { message } => {
            Error::internal(format!("history repository error: {message}"))
        }
    }
}

fn measurement_error(error: MeasurementError) -> Error {
    Error::invalid_request(error.to_string()).with_details(json!({
        "field": error.field.as_str(),
        "code": error.problem.code(),
    }))
}

/// Resolve the gender to predict with and whether it must be saved.
fn resolve_gender(user: &User, submitted: Option<&str>) -> Result<(Gender, bool), Error> {
    if let Some(stored) = user.gender() {
        return Ok((stored, false));
    }
    let raw = submitted.map(str::trim).filter(|raw| !raw.is_empty());
    let Some(raw) = raw else {
        return Err(Error::invalid_request("gender is required")
            .with_details(json!({ "field": "gender", "code": "missing" })));
    };
    Gender::parse(raw).map(|gender| (gender, true)).map_err(|err| {
        Error::invalid_request(format!("gender must be male or female, got {:?}", err.value()))
            .with_details(json!({ "field": "gender", "code": "unrecognised" }))
    })
}

/// Prediction service implementing the prediction command and history query.
#[derive(Clone)]
pub struct PredictionService<U, H> {
    user_repo: Arc<U>,
    history_repo: Arc<H>,
    estimator: Arc<dyn CalorieEstimator>,
    clock: Arc<dyn Clock>,
}

impl<U, H> PredictionService<U, H> {
    /// Create a service over the repositories, the loaded model and a clock.
    pub fn new(
        user_repo: Arc<U>,
        history_repo: Arc<H>,
        estimator: Arc<dyn CalorieEstimator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            history_repo,
            estimator,
            clock,
        }
    }
}

impl<U, H> PredictionService<U, H>
where
    U: UserRepository,
    H: HistoryRepository,
{
    async fn load_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(map_user_repository_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Estimate for `gender`, rounded; a non-finite result is an internal error.
    fn estimate(
        &self,
        user_id: &UserId,
        measurements: &Measurements,
        gender: Gender,
    ) -> Result<f64, Error> {
        let calories = round_to_hundredths(self.estimator.estimate(&measurements.features(gender)));
        if calories.is_finite() {
            Ok(calories)
        } else {
            warn!(%user_id, "model produced a non-finite estimate");
            Err(Error::internal("model produced a non-finite estimate"))
        }
    }

    async fn history_for(&self, user_id: &UserId) -> Result<Vec<HistoryEntry>, Error> {
        self.history_repo
            .list_for(user_id)
            .await
            .map_err(map_history_error)
    }
}

#[async_trait]
impl<U, H> PredictionCommand for PredictionService<U, H>
where
    U: UserRepository,
    H: HistoryRepository,
{
    async fn predict(
        &self,
        user_id: &UserId,
        request: PredictionRequest,
    ) -> Result<Prediction, Error> {
        let user = self.load_user(user_id).await?;
        let (gender, newly_chosen) = resolve_gender(&user, request.gender.as_deref())?;
        let measurements =
            Measurements::try_from_raw(&request.measurements).map_err(measurement_error)?;

        let mut calories = self.estimate(user_id, &measurements, gender)?;

        let gender = if newly_chosen {
            let stored = self
                .user_repo
                .set_gender(user_id, gender)
                .await
                .map_err(map_user_repository_error)?
                .ok_or_else(|| Error::unauthorized("login required"))?;
            if stored != gender {
                // A concurrent request recorded a different gender first.
                calories = self.estimate(user_id, &measurements, stored)?;
            }
            stored
        } else {
            gender
        };

        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            gender,
            measurements,
            predicted_calories: calories,
            created_at: self.clock.utc(),
        };
        self.history_repo
            .append(&entry)
            .await
            .map_err(map_history_error)?;
        info!(%user_id, entry_id = %entry.id, calories, "prediction recorded");

        let history = self.history_for(user_id).await?;
        Ok(Prediction {
            calories,
            accuracy: self.estimator.accuracy(),
            entry,
            history,
        })
    }
}

#[async_trait]
impl<U, H> HistoryQuery for PredictionService<U, H>
where
    U: UserRepository,
    H: HistoryRepository,
{
    async fn overview(&self, user_id: &UserId) -> Result<PredictionOverview, Error> {
        let user = self.load_user(user_id).await?;
        let history = self.history_for(user_id).await?;
        Ok(PredictionOverview {
            gender: user.gender(),
            accuracy: self.estimator.accuracy(),
            history,
        })
    }
}

#[cfg(test)]
#[path = "prediction_service_tests.rs"]
mod tests;
