//! Binary gender encoding shared by the trainer and the prediction service.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gender label accepted by the model.
///
/// Trained artifacts encode `male` as `1.0` and `female` as `0.0`; both the
/// trainer and the web application must agree on that mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Encoded as `1.0`.
    Male,
    /// Encoded as `0.0`.
    Female,
}

/// A label that is neither `male` nor `female`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised gender '{value}'")]
pub struct GenderParseError {
    value: String,
}

impl GenderParseError {
    /// The rejected label, untrimmed.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Gender {
    /// Parse a label, ignoring surrounding whitespace and ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use calorie_model::Gender;
    ///
    /// assert_eq!(Gender::parse(" Male "), Ok(Gender::Male));
    /// assert!(Gender::parse("other").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, GenderParseError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("male") {
            Ok(Self::Male)
        } else if trimmed.eq_ignore_ascii_case("female") {
            Ok(Self::Female)
        } else {
            Err(GenderParseError {
                value: raw.to_owned(),
            })
        }
    }

    /// Numeric indicator used as the first model feature.
    pub const fn encoded(self) -> f64 {
        match self {
            Self::Male => 1.0,
            Self::Female => 0.0,
        }
    }

    /// Canonical lowercase label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
