//! Error types for the calorie-model crate.
//!
//! Each stage of the training pipeline owns a semantic error enum built with
//! `thiserror`; [`TrainingError`] wraps them for callers that run the whole
//! pipeline at once.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading the labelled exercise dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    /// The dataset file could not be opened or read.
    #[error("failed to read dataset at '{path}': {message}")]
    Io {
        /// Path to the dataset.
        path: Utf8PathBuf,
        /// Description of the I/O failure.
        message: String,
    },

    /// A row could not be decoded into an exercise record.
    #[error("malformed dataset row {row}: {message}")]
    MalformedRow {
        /// 1-based data row (the header is row 0).
        row: usize,
        /// Description of the decoding failure.
        message: String,
    },

    /// A row carries a gender label other than `male` or `female`.
    #[error("unrecognised gender '{value}' on dataset row {row}")]
    UnknownGender {
        /// 1-based data row.
        row: usize,
        /// The offending label as it appeared in the file.
        value: String,
    },

    /// A numeric column held NaN or an infinity.
    #[error("non-finite value in column '{column}' on dataset row {row}")]
    NonFinite {
        /// 1-based data row.
        row: usize,
        /// Column name.
        column: &'static str,
    },

    /// The dataset contained a header but no data rows.
    #[error("dataset contains no rows")]
    Empty,
}

/// Errors raised while partitioning or fitting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// The test fraction lies outside the open interval (0, 1).
    #[error("test fraction must lie strictly between 0 and 1, got {fraction}")]
    InvalidTestFraction {
        /// The rejected fraction.
        fraction: f64,
    },

    /// Too few rows to fit every coefficient and still hold out a test set.
    #[error("need at least {required} training rows, have {actual}")]
    NotEnoughRows {
        /// Minimum training rows required.
        required: usize,
        /// Training rows available after the split.
        actual: usize,
    },

    /// The normal equations have no unique solution.
    #[error("normal equations are singular at feature '{feature}'")]
    Singular {
        /// Feature whose pivot vanished.
        feature: &'static str,
    },
}

/// Errors raised while reading or writing model artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    /// An artifact could not be read.
    #[error("failed to read artifact at '{path}': {message}")]
    Read {
        /// Path to the artifact.
        path: Utf8PathBuf,
        /// Description of the I/O failure.
        message: String,
    },

    /// An artifact could not be written.
    #[error("failed to write artifact at '{path}': {message}")]
    Write {
        /// Path to the artifact.
        path: Utf8PathBuf,
        /// Description of the I/O failure.
        message: String,
    },

    /// An artifact was readable but its contents are invalid.
    #[error("invalid artifact at '{path}': {message}")]
    Invalid {
        /// Path to the artifact.
        path: Utf8PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// The model artifact was written by an incompatible trainer.
    #[error("unsupported model format version: expected {expected}, found {actual}")]
    UnsupportedVersion {
        /// Version this crate understands.
        expected: u32,
        /// Version found in the artifact.
        actual: u32,
    },
}

/// Any failure of the end-to-end training pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    /// Reading the dataset failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    /// Splitting or fitting failed.
    #[error(transparent)]
    Fit(#[from] FitError),
    /// Persisting the artifacts failed.
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}
