//! Prediction history entries and the outcomes returned to callers.

use calorie_model::{Accuracy, Gender};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Measurements, UserId};

/// One immutable record of a past prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Entry identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Gender the prediction was made for.
    pub gender: Gender,
    /// Measurements the prediction was made from.
    pub measurements: Measurements,
    /// Model output rounded to two decimal places.
    pub predicted_calories: f64,
    /// When the prediction was made.
    pub created_at: DateTime<Utc>,
}

/// Sort `entries` newest first, breaking timestamp ties by id descending.
///
/// Adapters that cannot order in storage call this before returning.
pub fn sort_newest_first(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

/// Result of a successful prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Rounded calorie estimate.
    pub calories: f64,
    /// Accuracy reported by the loaded model.
    pub accuracy: Accuracy,
    /// The entry appended for this prediction.
    pub entry: HistoryEntry,
    /// Full history for the user, newest first, including `entry`.
    pub history: Vec<HistoryEntry>,
}

/// What the prediction page shows before a new submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOverview {
    /// Stored profile gender, if any.
    pub gender: Option<Gender>,
    /// Accuracy reported by the loaded model.
    pub accuracy: Accuracy,
    /// Full history for the user, newest first.
    pub history: Vec<HistoryEntry>,
}
