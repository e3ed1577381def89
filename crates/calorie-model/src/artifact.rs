//! Persisted model artifacts.
//!
//! Training produces two files: a JSON model artifact holding the fitted
//! parameters and provenance, and a plain-text file holding only the
//! accuracy percentage. The web application loads both once at start-up.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs::Dir};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::atomic_io::{StagedFile, sync_dir};
use crate::error::ArtifactError;
use crate::metrics::Accuracy;
use crate::regression::{FEATURE_COUNT, FEATURE_NAMES, LinearModel};

/// Version written into every model artifact.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Serialised form of a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModelArtifact {
    /// Layout version; see [`MODEL_FORMAT_VERSION`].
    pub format_version: u32,
    /// Feature names in coefficient order.
    pub features: Vec<String>,
    /// Constant term.
    pub intercept: f64,
    /// One weight per feature.
    pub coefficients: Vec<f64>,
    /// Held-out accuracy percentage.
    pub accuracy: Accuracy,
    /// Seed used for the train/test shuffle.
    pub seed: u64,
    /// Rows used for fitting.
    pub train_rows: usize,
    /// Rows held out for scoring.
    pub test_rows: usize,
}

impl ModelArtifact {
    /// Describe `model` together with how it was trained.
    #[must_use]
    pub fn new(
        model: &LinearModel,
        accuracy: Accuracy,
        seed: u64,
        train_rows: usize,
        test_rows: usize,
    ) -> Self {
        Self {
            format_version: MODEL_FORMAT_VERSION,
            features: FEATURE_NAMES.iter().map(|name| (*name).to_owned()).collect(),
            intercept: model.intercept(),
            coefficients: model.coefficients().to_vec(),
            accuracy,
            seed,
            train_rows,
            test_rows,
        }
    }

    /// Check the layout and rebuild the linear function.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::UnsupportedVersion`] for a foreign format
    /// version and [`ArtifactError::Invalid`] when the coefficients do not
    /// match the feature layout or are not finite.
    pub fn to_model(&self, path: &Utf8Path) -> Result<LinearModel, ArtifactError> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                expected: MODEL_FORMAT_VERSION,
                actual: self.format_version,
            });
        }
        let invalid = |message: String| ArtifactError::Invalid {
            path: path.to_path_buf(),
            message,
        };
        let coefficients: [f64; FEATURE_COUNT] =
            self.coefficients.as_slice().try_into().map_err(|_| {
                invalid(format!(
                    "expected {FEATURE_COUNT} coefficients, found {}",
                    self.coefficients.len()
                ))
            })?;
        if !self.intercept.is_finite() || coefficients.iter().any(|value| !value.is_finite()) {
            return Err(invalid("model parameters must be finite".to_owned()));
        }
        Ok(LinearModel::from_parts(self.intercept, coefficients))
    }
}

/// Locations of the two artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    model: Utf8PathBuf,
    accuracy: Utf8PathBuf,
}

impl ArtifactPaths {
    /// Pair a model path with an accuracy path.
    ///
    /// The write path requires both files to share a directory; loading
    /// accepts any two locations.
    #[must_use]
    pub fn new(model: impl Into<Utf8PathBuf>, accuracy: impl Into<Utf8PathBuf>) -> Self {
        Self {
            model: model.into(),
            accuracy: accuracy.into(),
        }
    }

    /// Model artifact location.
    #[must_use]
    pub fn model(&self) -> &Utf8Path {
        &self.model
    }

    /// Accuracy file location.
    #[must_use]
    pub fn accuracy(&self) -> &Utf8Path {
        &self.accuracy
    }
}

/// Stage both artifacts in `dir`, then rename them into place model first.
///
/// `model_file` and `accuracy_file` are bare file names inside `dir`. If
/// anything fails before the first rename, neither file is touched.
///
/// # Errors
///
/// Returns [`ArtifactError::Write`] naming the file that could not be
/// written or renamed, or [`ArtifactError::Invalid`] if the artifact cannot
/// be serialised.
pub fn write_artifacts(
    dir: &Dir,
    model_file: &Utf8Path,
    accuracy_file: &Utf8Path,
    artifact: &ModelArtifact,
) -> Result<(), ArtifactError> {
    let write_error = |path: &Utf8Path| {
        let path = path.to_path_buf();
        move |err: io::Error| ArtifactError::Write {
            path,
            message: err.to_string(),
        }
    };
    let model_json = serde_json::to_string_pretty(artifact).map_err(|err| {
        ArtifactError::Invalid {
            path: model_file.to_path_buf(),
            message: err.to_string(),
        }
    })?;
    let accuracy_text = format!("{}\n", artifact.accuracy);

    let staged_model =
        StagedFile::stage(dir, model_file, &model_json).map_err(write_error(model_file))?;
    let staged_accuracy = StagedFile::stage(dir, accuracy_file, &accuracy_text)
        .map_err(write_error(accuracy_file))?;

    staged_model.commit().map_err(write_error(model_file))?;
    staged_accuracy
        .commit()
        .map_err(write_error(accuracy_file))?;
    sync_dir(dir);

    info!(
        model = %model_file,
        accuracy_file = %accuracy_file,
        accuracy = %artifact.accuracy,
        "model artifacts written"
    );
    Ok(())
}

/// Read both artifacts and return the fitted model with its accuracy.
///
/// The accuracy reported is the one in the plain-text file.
///
/// # Errors
///
/// Returns [`ArtifactError::Read`] when a file cannot be read and
/// [`ArtifactError::Invalid`] or [`ArtifactError::UnsupportedVersion`] when
/// its contents are unusable.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<(LinearModel, Accuracy), ArtifactError> {
    let model_text = read_file(paths.model())?;
    let artifact: ModelArtifact =
        serde_json::from_str(&model_text).map_err(|err| ArtifactError::Invalid {
            path: paths.model().to_path_buf(),
            message: err.to_string(),
        })?;
    let model = artifact.to_model(paths.model())?;

    let accuracy_text = read_file(paths.accuracy())?;
    let accuracy = accuracy_text
        .parse::<Accuracy>()
        .map_err(|err| ArtifactError::Invalid {
            path: paths.accuracy().to_path_buf(),
            message: err.to_string(),
        })?;
    Ok((model, accuracy))
}

fn read_file(path: &Utf8Path) -> Result<String, ArtifactError> {
    let read_error = |message: String| ArtifactError::Read {
        path: path.to_path_buf(),
        message,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error("path must name a file".to_owned()))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|err| read_error(err.to_string()))?;
    dir.read_to_string(file_name)
        .map_err(|err| read_error(err.to_string()))
}
