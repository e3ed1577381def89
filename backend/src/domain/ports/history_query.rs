//! Driving port for reading prediction history.

use async_trait::async_trait;

use crate::domain::{Error, PredictionOverview, UserId};

/// Domain use-case port for the prediction page.
#[async_trait]
pub trait HistoryQuery: Send + Sync {
    /// Stored gender, model accuracy and full history for `user_id`.
    async fn overview(&self, user_id: &UserId) -> Result<PredictionOverview, Error>;
}
