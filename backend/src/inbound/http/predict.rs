//! Prediction handlers.
//!
//! ```text
//! GET /api/v1/predict
//! POST /api/v1/predict {"gender":"male","age":28,"height":"175","weight":72,"duration":30,"heartRate":105,"bodyTemp":40.5}
//! ```

use actix_web::{get, post, web};
use calorie_model::{Accuracy, Gender};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::ports::PredictionRequest;
use crate::domain::{HistoryEntry, Prediction, PredictionOverview, RawMeasurements, RawNumber};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::forget_stale_session;

/// A measurement as submitted: a JSON number or a numeric string.
///
/// Any other JSON value is kept so validation can reject it by field name.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum MeasurementInput {
    Number(f64),
    Text(String),
    #[schema(value_type = Object)]
    Other(Value),
}

impl From<MeasurementInput> for RawNumber {
    fn from(value: MeasurementInput) -> Self {
        match value {
            MeasurementInput::Number(number) => Self::Number(number),
            MeasurementInput::Text(text) => Self::Text(text),
            MeasurementInput::Other(other) => Self::Text(other.to_string()),
        }
    }
}

/// Request body for `POST /api/v1/predict`.
///
/// Every field is optional at the JSON level so a missing one is reported
/// through the usual validation envelope.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    /// Ignored once the profile has a gender.
    #[schema(example = "female")]
    pub gender: Option<String>,
    pub age: Option<MeasurementInput>,
    pub height: Option<MeasurementInput>,
    pub weight: Option<MeasurementInput>,
    pub duration: Option<MeasurementInput>,
    pub heart_rate: Option<MeasurementInput>,
    pub body_temp: Option<MeasurementInput>,
}

impl From<PredictRequest> for PredictionRequest {
    fn from(value: PredictRequest) -> Self {
        Self {
            gender: value.gender,
            measurements: RawMeasurements {
                age: value.age.map(RawNumber::from),
                height: value.height.map(RawNumber::from),
                weight: value.weight.map(RawNumber::from),
                duration: value.duration.map(RawNumber::from),
                heart_rate: value.heart_rate.map(RawNumber::from),
                body_temp: value.body_temp.map(RawNumber::from),
            },
        }
    }
}

/// One past prediction.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryResponse {
    pub id: Uuid,
    #[schema(value_type = String, example = "male")]
    pub gender: Gender,
    pub age: f64,
    pub height: f64,
    pub weight: f64,
    pub duration: f64,
    pub heart_rate: f64,
    pub body_temp: f64,
    #[schema(example = 187.46)]
    pub predicted_calories: f64,
    pub created_at: DateTime<Utc>,
}

impl From<HistoryEntry> for HistoryEntryResponse {
    fn from(entry: HistoryEntry) -> Self {
        let HistoryEntry {
            id,
            gender,
            measurements,
            predicted_calories,
            created_at,
            ..
        } = entry;
        Self {
            id,
            gender,
            age: measurements.age,
            height: measurements.height,
            weight: measurements.weight,
            duration: measurements.duration,
            heart_rate: measurements.heart_rate,
            body_temp: measurements.body_temp,
            predicted_calories,
            created_at,
        }
    }
}

fn history_response(history: Vec<HistoryEntry>) -> Vec<HistoryEntryResponse> {
    history.into_iter().map(HistoryEntryResponse::from).collect()
}

/// Response body for `POST /api/v1/predict`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    /// Estimated calories, rounded to two decimals.
    #[schema(example = 187.46)]
    pub prediction: f64,
    /// Held-out R² of the loaded model, as a percentage.
    #[schema(value_type = f64, example = 96.73)]
    pub accuracy: Accuracy,
    pub entry: HistoryEntryResponse,
    /// Newest first, including `entry`.
    pub history: Vec<HistoryEntryResponse>,
}

impl From<Prediction> for PredictionResponse {
    fn from(value: Prediction) -> Self {
        Self {
            prediction: value.calories,
            accuracy: value.accuracy,
            entry: HistoryEntryResponse::from(value.entry),
            history: history_response(value.history),
        }
    }
}

/// Response body for `GET /api/v1/predict`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOverviewResponse {
    /// Stored profile gender; `null` until the first prediction.
    #[schema(value_type = Option<String>)]
    pub gender: Option<Gender>,
    #[schema(value_type = f64, example = 96.73)]
    pub accuracy: Accuracy,
    pub history: Vec<HistoryEntryResponse>,
}

impl From<PredictionOverview> for PredictionOverviewResponse {
    fn from(value: PredictionOverview) -> Self {
        Self {
            gender: value.gender,
            accuracy: value.accuracy,
            history: history_response(value.history),
        }
    }
}

/// Model accuracy, stored gender and history for the current user.
#[utoipa::path(
    get,
    path = "/api/v1/predict",
    responses(
        (status = 200, description = "Prediction overview", body = PredictionOverviewResponse),
        (status = 401, description = "No active session", body = ErrorSchema),
        (status = 503, description = "History store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["predictions"],
    operation_id = "predictionOverview"
)]
#[get("/predict")]
pub async fn prediction_overview(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<PredictionOverviewResponse>> {
    let user_id = session.require_user_id()?;
    let overview = state
        .history
        .overview(&user_id)
        .await
        .inspect_err(|err| forget_stale_session(&session, err))?;
    Ok(web::Json(PredictionOverviewResponse::from(overview)))
}

/// Predict calories burnt and record the request in the user's history.
#[utoipa::path(
    post,
    path = "/api/v1/predict",
    request_body = PredictRequest,
    responses(
        (status = 200, description = "Prediction recorded", body = PredictionResponse),
        (status = 400, description = "A field is missing or not a number", body = ErrorSchema),
        (status = 401, description = "No active session", body = ErrorSchema),
        (status = 503, description = "History store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["predictions"],
    operation_id = "predict"
)]
#[post("/predict")]
pub async fn predict(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PredictRequest>,
) -> ApiResult<web::Json<PredictionResponse>> {
    let user_id = session.require_user_id()?;
    let prediction = state
        .prediction
        .predict(&user_id, PredictionRequest::from(payload.into_inner()))
        .await
        .inspect_err(|err| forget_stale_session(&session, err))?;
    Ok(web::Json(PredictionResponse::from(prediction)))
}
