//! Goodness-of-fit scoring and the reported accuracy percentage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Round to two decimal places, halves away from zero.
///
/// Values too large to scale by 100 are returned unchanged; at that
/// magnitude an `f64` has no fractional digits left to round.
///
/// # Examples
///
/// ```
/// use calorie_model::round_to_hundredths;
///
/// assert_eq!(round_to_hundredths(187.456), 187.46);
/// assert_eq!(round_to_hundredths(-0.125), -0.13);
/// ```
#[must_use]
pub fn round_to_hundredths(value: f64) -> f64 {
    let scaled = value * 100.0;
    if scaled.is_finite() {
        scaled.round() / 100.0
    } else {
        value
    }
}

/// Coefficient of determination of `predicted` against `actual`.
///
/// When `actual` has no variance the score is `1.0` for an exact match and
/// `0.0` otherwise. Extra elements in the longer slice are ignored.
#[must_use]
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let count = actual.len().min(predicted.len());
    if count == 0 {
        return 0.0;
    }
    let pairs = || actual.iter().zip(predicted).take(count);
    #[expect(
        clippy::cast_precision_loss,
        reason = "row counts stay far below 2^52"
    )]
    let mean = pairs().map(|(value, _)| value).sum::<f64>() / count as f64;
    let total: f64 = pairs().map(|(value, _)| (value - mean).powi(2)).sum();
    let residual: f64 = pairs()
        .map(|(value, estimate)| (value - estimate).powi(2))
        .sum();
    if total == 0.0 {
        return if residual == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - residual / total
}

/// Held-out R² expressed as a percentage rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Accuracy(f64);

/// The accuracy file did not hold a finite number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("accuracy must be a finite number, got '{0}'")]
pub struct AccuracyParseError(String);

impl Accuracy {
    /// Convert an R² score into a rounded percentage.
    #[must_use]
    pub fn from_r2(r2: f64) -> Self {
        Self(round_to_hundredths(r2 * 100.0))
    }

    /// Wrap an already computed percentage, rounding it to two decimals.
    #[must_use]
    pub fn from_percent(percent: f64) -> Self {
        Self(round_to_hundredths(percent))
    }

    /// The percentage value, e.g. `96.73`.
    #[must_use]
    pub const fn percent(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Accuracy {
    type Err = AccuracyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Self::from_percent(value)),
            _ => Err(AccuracyParseError(trimmed.to_owned())),
        }
    }
}
