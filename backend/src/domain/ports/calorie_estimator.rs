//! Driven port for the loaded regression model.

use calorie_model::{Accuracy, FeatureVector};

/// Read-only calorie model loaded once at startup.
#[cfg_attr(test, mockall::automock)]
pub trait CalorieEstimator: Send + Sync {
    /// Unrounded calorie estimate for `features`.
    fn estimate(&self, features: &FeatureVector) -> f64;

    /// Held-out accuracy recorded when the model was trained.
    fn accuracy(&self) -> Accuracy;
}
