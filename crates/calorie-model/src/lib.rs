//! Offline calorie-expenditure model: dataset parsing, least-squares fitting,
//! held-out scoring, and the artifacts the web application loads.
//!
//! The crate has no web or database dependencies so the trainer binary and
//! the backend can share the feature encoding without pulling each other in.
//!
//! # Example
//!
//! ```
//! use calorie_model::{FeatureVector, Gender, LinearModel};
//!
//! let model = LinearModel::from_parts(-10.0, [2.0, 0.0, 0.0, 0.0, 6.0, 0.0, 0.0]);
//! let input = FeatureVector::new(Gender::Male, 28.0, 175.0, 72.0, 30.0, 105.0, 40.5);
//! assert_eq!(model.predict(&input), 172.0);
//! ```

mod artifact;
mod atomic_io;
mod dataset;
mod error;
mod gender;
mod metrics;
mod regression;
mod split;
mod trainer;

pub use artifact::{
    ArtifactPaths, MODEL_FORMAT_VERSION, ModelArtifact, load_artifacts, write_artifacts,
};
pub use dataset::{Dataset, ExerciseRecord};
pub use error::{ArtifactError, DatasetError, FitError, TrainingError};
pub use gender::{Gender, GenderParseError};
pub use metrics::{Accuracy, AccuracyParseError, r2_score, round_to_hundredths};
pub use regression::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector, LinearModel};
pub use split::{MIN_TRAIN_ROWS, TrainTestSplit, train_test_split};
pub use trainer::{DEFAULT_SEED, DEFAULT_TEST_FRACTION, Trainer, TrainerConfig, TrainingReport};
