//! End-to-end training: split, fit, score, persist.

use camino::Utf8Path;
use cap_std::fs::Dir;
use tracing::info;

use crate::artifact::{ModelArtifact, write_artifacts};
use crate::dataset::{Dataset, ExerciseRecord};
use crate::error::{FitError, TrainingError};
use crate::metrics::{Accuracy, r2_score};
use crate::regression::{FeatureVector, LinearModel};
use crate::split::train_test_split;

/// Seed used when none is supplied.
pub const DEFAULT_SEED: u64 = 2;

/// Held-out share used when none is supplied.
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

/// Knobs controlling the train/test split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainerConfig {
    /// Shuffle seed.
    pub seed: u64,
    /// Share of rows held out for scoring, in `(0, 1)`.
    pub test_fraction: f64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_fraction: DEFAULT_TEST_FRACTION,
        }
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    /// Fitted parameters.
    pub model: LinearModel,
    /// Held-out accuracy.
    pub accuracy: Accuracy,
    /// Seed that produced the split.
    pub seed: u64,
    /// Rows used for fitting.
    pub train_rows: usize,
    /// Rows used for scoring.
    pub test_rows: usize,
}

impl TrainingReport {
    /// The persisted form of this run.
    #[must_use]
    pub fn artifact(&self) -> ModelArtifact {
        ModelArtifact::new(
            &self.model,
            self.accuracy,
            self.seed,
            self.train_rows,
            self.test_rows,
        )
    }
}

/// Fits calorie models from labelled datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Create a trainer with the given split settings.
    #[must_use]
    pub const fn new(config: TrainerConfig) -> Self {
        Self { config }
    }

    /// Split `dataset`, fit on the training rows and score the rest.
    ///
    /// # Errors
    ///
    /// Returns [`FitError`] when the split is impossible or the features are
    /// collinear.
    pub fn train(&self, dataset: &Dataset) -> Result<TrainingReport, FitError> {
        let records = dataset.records();
        let split = train_test_split(records.len(), self.config.test_fraction, self.config.seed)?;
        info!(
            train_rows = split.train().len(),
            test_rows = split.test().len(),
            seed = self.config.seed,
            "dataset split"
        );

        let (train_features, train_targets) = columns(records, split.train());
        let model = LinearModel::fit(&train_features, &train_targets)?;

        let (test_features, test_targets) = columns(records, split.test());
        let predicted: Vec<f64> = test_features
            .iter()
            .map(|features| model.predict(features))
            .collect();
        let accuracy = Accuracy::from_r2(r2_score(&test_targets, &predicted));
        info!(accuracy = %accuracy, "model scored on held-out rows");

        Ok(TrainingReport {
            model,
            accuracy,
            seed: self.config.seed,
            train_rows: split.train().len(),
            test_rows: split.test().len(),
        })
    }

    /// Load the dataset at `data`, train, and write both artifacts into
    /// `output`.
    ///
    /// Nothing is written unless the dataset loads and the fit succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`TrainingError`] wrapping the failing stage.
    pub fn train_and_persist(
        &self,
        data: &Utf8Path,
        output: &Dir,
        model_file: &Utf8Path,
        accuracy_file: &Utf8Path,
    ) -> Result<TrainingReport, TrainingError> {
        let dataset = Dataset::load(data)?;
        info!(path = %data, rows = dataset.len(), "dataset loaded");
        let report = self.train(&dataset)?;
        write_artifacts(output, model_file, accuracy_file, &report.artifact())?;
        Ok(report)
    }
}

fn columns(records: &[ExerciseRecord], indices: &[usize]) -> (Vec<FeatureVector>, Vec<f64>) {
    indices
        .iter()
        .filter_map(|&index| records.get(index))
        .map(|record| (record.features(), record.calories))
        .unzip()
}
