//! Model store: the trained regression loaded from disk.
//!
//! Artifacts are read once at startup. The loaded value is immutable and
//! shared behind an `Arc`, so retraining takes effect on the next restart.

use calorie_model::{Accuracy, ArtifactError, ArtifactPaths, FeatureVector, LinearModel};
use tracing::info;

use crate::domain::ports::CalorieEstimator;

/// Fitted model plus the accuracy recorded at training time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedModel {
    model: LinearModel,
    accuracy: Accuracy,
}

impl LoadedModel {
    /// Wrap an already fitted model.
    pub fn new(model: LinearModel, accuracy: Accuracy) -> Self {
        Self { model, accuracy }
    }

    /// Read both artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError`] when either file is missing or malformed.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let (model, accuracy) = calorie_model::load_artifacts(paths)?;
        info!(
            model = %paths.model(),
            accuracy = %accuracy,
            "loaded calorie model"
        );
        Ok(Self::new(model, accuracy))
    }
}

impl CalorieEstimator for LoadedModel {
    fn estimate(&self, features: &FeatureVector) -> f64 {
        self.model.predict(features)
    }

    fn accuracy(&self) -> Accuracy {
        self.accuracy
    }
}
