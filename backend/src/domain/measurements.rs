//! Physiological measurements submitted for a prediction.
//!
//! Inbound adapters hand over whatever the client sent for each field; this
//! module turns that into finite numbers or reports the first offending
//! field in the fixed order age, height, weight, duration, heart rate, body
//! temperature.

use std::fmt;

use calorie_model::{FeatureVector, Gender};

/// One numeric field as received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum RawNumber {
    /// A JSON number.
    Number(f64),
    /// A string expected to hold a number, such as a form value.
    Text(String),
}

/// The six numeric measurement fields, in validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementField {
    /// Age in years.
    Age,
    /// Height in centimetres.
    Height,
    /// Weight in kilograms.
    Weight,
    /// Exercise duration in minutes.
    Duration,
    /// Heart rate in beats per minute.
    HeartRate,
    /// Body temperature in degrees Celsius.
    BodyTemp,
}

impl MeasurementField {
    /// Every field in validation order.
    pub const ALL: [Self; 6] = [
        Self::Age,
        Self::Height,
        Self::Weight,
        Self::Duration,
        Self::HeartRate,
        Self::BodyTemp,
    ];

    /// Stable snake_case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Height => "height",
            Self::Weight => "weight",
            Self::Duration => "duration",
            Self::HeartRate => "heart_rate",
            Self::BodyTemp => "body_temp",
        }
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a measurement field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementProblem {
    /// The field was absent or blank.
    Missing,
    /// The text did not parse as a number.
    NotANumber,
    /// The value was NaN or infinite.
    NotFinite,
}

impl MeasurementProblem {
    /// Stable machine-readable reason.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NotANumber => "not_a_number",
            Self::NotFinite => "not_finite",
        }
    }
}

/// First measurement field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeasurementError {
    /// The offending field.
    pub field: MeasurementField,
    /// What was wrong with it.
    pub problem: MeasurementProblem,
}

impl fmt::Display for MeasurementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field;
        match self.problem {
            MeasurementProblem::Missing => write!(f, "{field} is required"),
            MeasurementProblem::NotANumber => write!(f, "{field} must be a number"),
            MeasurementProblem::NotFinite => write!(f, "{field} must be a finite number"),
        }
    }
}

impl std::error::Error for MeasurementError {}

/// Unvalidated measurement fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMeasurements {
    /// Age in years.
    pub age: Option<RawNumber>,
    /// Height in centimetres.
    pub height: Option<RawNumber>,
    /// Weight in kilograms.
    pub weight: Option<RawNumber>,
    /// Exercise duration in minutes.
    pub duration: Option<RawNumber>,
    /// Heart rate in beats per minute.
    pub heart_rate: Option<RawNumber>,
    /// Body temperature in degrees Celsius.
    pub body_temp: Option<RawNumber>,
}

impl RawMeasurements {
    fn get(&self, field: MeasurementField) -> Option<&RawNumber> {
        match field {
            MeasurementField::Age => self.age.as_ref(),
            MeasurementField::Height => self.height.as_ref(),
            MeasurementField::Weight => self.weight.as_ref(),
            MeasurementField::Duration => self.duration.as_ref(),
            MeasurementField::HeartRate => self.heart_rate.as_ref(),
            MeasurementField::BodyTemp => self.body_temp.as_ref(),
        }
    }
}

/// Validated, finite measurements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    /// Age in years.
    pub age: f64,
    /// Height in centimetres.
    pub height: f64,
    /// Weight in kilograms.
    pub weight: f64,
    /// Exercise duration in minutes.
    pub duration: f64,
    /// Heart rate in beats per minute.
    pub heart_rate: f64,
    /// Body temperature in degrees Celsius.
    pub body_temp: f64,
}

impl Measurements {
    /// Validate every field in order, stopping at the first failure.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{MeasurementField, Measurements, RawMeasurements, RawNumber};
    ///
    /// let raw = RawMeasurements {
    ///     age: Some(RawNumber::Text(" 28 ".into())),
    ///     height: Some(RawNumber::Number(175.0)),
    ///     weight: Some(RawNumber::Text("abc".into())),
    ///     ..RawMeasurements::default()
    /// };
    /// let err = Measurements::try_from_raw(&raw).unwrap_err();
    /// assert_eq!(err.field, MeasurementField::Weight);
    /// ```
    pub fn try_from_raw(raw: &RawMeasurements) -> Result<Self, MeasurementError> {
        let mut values = [0.0; 6];
        for (slot, field) in values.iter_mut().zip(MeasurementField::ALL) {
            *slot = parse_field(field, raw.get(field))?;
        }
        let [age, height, weight, duration, heart_rate, body_temp] = values;
        Ok(Self {
            age,
            height,
            weight,
            duration,
            heart_rate,
            body_temp,
        })
    }

    /// Model input for these measurements and `gender`.
    pub fn features(&self, gender: Gender) -> FeatureVector {
        FeatureVector::new(
            gender,
            self.age,
            self.height,
            self.weight,
            self.duration,
            self.heart_rate,
            self.body_temp,
        )
    }
}

fn parse_field(field: MeasurementField, raw: Option<&RawNumber>) -> Result<f64, MeasurementError> {
    let fail = |problem| MeasurementError { field, problem };
    let value = match raw {
        None => return Err(fail(MeasurementProblem::Missing)),
        Some(RawNumber::Number(value)) => *value,
        Some(RawNumber::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Err(fail(MeasurementProblem::Missing));
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| fail(MeasurementProblem::NotANumber))?
        }
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(fail(MeasurementProblem::NotFinite))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn number(value: f64) -> Option<RawNumber> {
        Some(RawNumber::Number(value))
    }

    fn text(value: &str) -> Option<RawNumber> {
        Some(RawNumber::Text(value.to_owned()))
    }

    #[fixture]
    fn complete() -> RawMeasurements {
        RawMeasurements {
            age: number(28.0),
            height: text("175"),
            weight: number(72.0),
            duration: text(" 30.5 "),
            heart_rate: number(105.0),
            body_temp: text("40.5"),
        }
    }

    #[rstest]
    fn accepts_numbers_and_numeric_strings(complete: RawMeasurements) {
        let measurements = Measurements::try_from_raw(&complete).expect("valid measurements");
        assert_eq!(
            measurements,
            Measurements {
                age: 28.0,
                height: 175.0,
                weight: 72.0,
                duration: 30.5,
                heart_rate: 105.0,
                body_temp: 40.5,
            }
        );
    }

    #[rstest]
    fn features_follow_model_order(complete: RawMeasurements) {
        let measurements = Measurements::try_from_raw(&complete).expect("valid measurements");
        let features = measurements.features(Gender::Male);
        assert_eq!(
            features.as_array(),
            &[1.0, 28.0, 175.0, 72.0, 30.5, 105.0, 40.5]
        );
    }

    #[rstest]
    #[case(MeasurementField::Age, None, MeasurementProblem::Missing)]
    #[case(MeasurementField::Height, text("  "), MeasurementProblem::Missing)]
    #[case(MeasurementField::Weight, text("heavy"), MeasurementProblem::NotANumber)]
    #[case(MeasurementField::Duration, text("NaN"), MeasurementProblem::NotFinite)]
    #[case(MeasurementField::HeartRate, number(f64::INFINITY), MeasurementProblem::NotFinite)]
    #[case(MeasurementField::BodyTemp, text("inf"), MeasurementProblem::NotFinite)]
    fn reports_offending_field(
        mut complete: RawMeasurements,
        #[case] field: MeasurementField,
        #[case] value: Option<RawNumber>,
        #[case] problem: MeasurementProblem,
    ) {
        match field {
            MeasurementField::Age => complete.age = value,
            MeasurementField::Height => complete.height = value,
            MeasurementField::Weight => complete.weight = value,
            MeasurementField::Duration => complete.duration = value,
            MeasurementField::HeartRate => complete.heart_rate = value,
            MeasurementField::BodyTemp => complete.body_temp = value,
        }
        let err = Measurements::try_from_raw(&complete).expect_err("field rejected");
        assert_eq!(err, MeasurementError { field, problem });
    }

    #[rstest]
    fn first_failure_in_order_wins(mut complete: RawMeasurements) {
        complete.body_temp = None;
        complete.height = text("tall");
        let err = Measurements::try_from_raw(&complete).expect_err("rejected");
        assert_eq!(err.field, MeasurementField::Height);
        assert_eq!(err.to_string(), "height must be a number");
    }
}
