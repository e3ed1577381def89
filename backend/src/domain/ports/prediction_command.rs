//! Driving port for running predictions.

use async_trait::async_trait;

use crate::domain::{Error, Prediction, RawMeasurements, UserId};

/// Unvalidated prediction input as received from a client.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionRequest {
    /// Submitted gender label; ignored when the profile already has one.
    pub gender: Option<String>,
    /// Submitted numeric fields.
    pub measurements: RawMeasurements,
}

/// Domain use-case port for predicting calories and recording history.
#[async_trait]
pub trait PredictionCommand: Send + Sync {
    /// Validate, predict, and append one history entry for `user_id`.
    ///
    /// Nothing is written when validation fails.
    async fn predict(
        &self,
        user_id: &UserId,
        request: PredictionRequest,
    ) -> Result<Prediction, Error>;
}
