//! Labelled exercise dataset loading.
//!
//! The dataset is a headed CSV file with one row per exercise session. The
//! identifier column is read past and discarded; headers may use either the
//! snake-case names or the capitalised names of the public calories dataset
//! (`User_ID`, `Gender`, `Heart_Rate`, ...).

use std::io;

use camino::Utf8Path;
use cap_std::{ambient_authority, fs::Dir};
use serde::Deserialize;
use tracing::debug;

use crate::error::DatasetError;
use crate::gender::Gender;
use crate::regression::FeatureVector;

/// One decoded, validated dataset row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExerciseRecord {
    /// Gender of the participant.
    pub gender: Gender,
    /// Age in years.
    pub age: f64,
    /// Height in centimetres.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    /// Exercise duration in minutes.
    pub duration: f64,
    /// Mean heart rate in beats per minute.
    pub heart_rate: f64,
    /// Body temperature in degrees Celsius.
    pub body_temp: f64,
    /// Observed calorie expenditure (the regression target).
    pub calories: f64,
}

impl ExerciseRecord {
    /// The seven model inputs in their fixed order.
    #[must_use]
    pub const fn features(&self) -> FeatureVector {
        FeatureVector::new(
            self.gender,
            self.age,
            self.height,
            self.weight,
            self.duration,
            self.heart_rate,
            self.body_temp,
        )
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(alias = "Gender")]
    gender: String,
    #[serde(alias = "Age")]
    age: f64,
    #[serde(alias = "Height")]
    height: f64,
    #[serde(alias = "Weight")]
    weight: f64,
    #[serde(alias = "Duration")]
    duration: f64,
    #[serde(alias = "Heart_Rate")]
    heart_rate: f64,
    #[serde(alias = "Body_Temp")]
    body_temp: f64,
    #[serde(alias = "Calories")]
    calories: f64,
}

impl RawRow {
    fn into_record(self, row: usize) -> Result<ExerciseRecord, DatasetError> {
        let gender = Gender::parse(&self.gender).map_err(|err| DatasetError::UnknownGender {
            row,
            value: err.value().to_owned(),
        })?;
        let columns = [
            ("age", self.age),
            ("height", self.height),
            ("weight", self.weight),
            ("duration", self.duration),
            ("heart_rate", self.heart_rate),
            ("body_temp", self.body_temp),
            ("calories", self.calories),
        ];
        if let Some((column, _)) = columns.iter().copied().find(|(_, value)| !value.is_finite()) {
            return Err(DatasetError::NonFinite { row, column });
        }
        Ok(ExerciseRecord {
            gender,
            age: self.age,
            height: self.height,
            weight: self.weight,
            duration: self.duration,
            heart_rate: self.heart_rate,
            body_temp: self.body_temp,
            calories: self.calories,
        })
    }
}

/// A fully validated dataset held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<ExerciseRecord>,
}

impl Dataset {
    /// Build a dataset from records that were validated elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Empty`] when `records` is empty.
    pub fn from_records(records: Vec<ExerciseRecord>) -> Result<Self, DatasetError> {
        if records.is_empty() {
            return Err(DatasetError::Empty);
        }
        Ok(Self { records })
    }

    /// Parse CSV text from any reader.
    ///
    /// Every row is validated; the first bad row aborts parsing.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] for malformed rows, unknown gender labels,
    /// non-finite numbers, or an empty file.
    ///
    /// # Examples
    ///
    /// ```
    /// use calorie_model::Dataset;
    ///
    /// let csv = "User_ID,Gender,Age,Height,Weight,Duration,Heart_Rate,Body_Temp,Calories\n\
    ///            1,male,68,190,94,29,105,40.8,231\n";
    /// let dataset = Dataset::from_reader(csv.as_bytes()).expect("valid csv");
    /// assert_eq!(dataset.len(), 1);
    /// ```
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();
        for (index, result) in csv_reader.deserialize::<RawRow>().enumerate() {
            let row = index + 1;
            let raw = result.map_err(|err| DatasetError::MalformedRow {
                row,
                message: err.to_string(),
            })?;
            records.push(raw.into_record(row)?);
        }
        Self::from_records(records)
    }

    /// Read and parse the dataset at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] when the file cannot be opened, otherwise
    /// the errors of [`Dataset::from_reader`].
    pub fn load(path: &Utf8Path) -> Result<Self, DatasetError> {
        let io_error = |err: io::Error| DatasetError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let file_name = path.file_name().ok_or_else(|| DatasetError::Io {
            path: path.to_path_buf(),
            message: "dataset path must name a file".to_owned(),
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(io_error)?;
        let file = dir.open(file_name).map_err(io_error)?;
        let dataset = Self::from_reader(io::BufReader::new(file))?;
        debug!(path = %path, rows = dataset.len(), "dataset loaded");
        Ok(dataset)
    }

    /// Validated rows in file order.
    #[must_use]
    pub fn records(&self) -> &[ExerciseRecord] {
        &self.records
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; an empty dataset cannot be constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
