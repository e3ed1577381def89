//! Ordinary least-squares regression over the seven exercise features.

use ndarray::{Array1, Array2, Axis};

use crate::error::FitError;
use crate::gender::Gender;

/// Number of model inputs.
pub const FEATURE_COUNT: usize = 7;

/// Model input names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "gender",
    "age",
    "height",
    "weight",
    "duration",
    "heart_rate",
    "body_temp",
];

/// Squared deviation sums at or below this are treated as constant columns.
const ZERO_VARIANCE: f64 = 1e-12;

/// Pivots smaller than this fraction of the largest diagonal entry are
/// treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-10;

/// Encoded model input: `[gender, age, height, weight, duration, heart_rate,
/// body_temp]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Assemble the vector in its fixed order.
    #[must_use]
    pub const fn new(
        gender: Gender,
        age: f64,
        height: f64,
        weight: f64,
        duration: f64,
        heart_rate: f64,
        body_temp: f64,
    ) -> Self {
        Self([
            gender.encoded(),
            age,
            height,
            weight,
            duration,
            heart_rate,
            body_temp,
        ])
    }

    /// Raw values in feature order.
    #[must_use]
    pub const fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }
}

/// A fitted linear function `intercept + coefficients · features`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    intercept: f64,
    coefficients: [f64; FEATURE_COUNT],
}

impl LinearModel {
    /// Rebuild a model from stored parameters.
    #[must_use]
    pub const fn from_parts(intercept: f64, coefficients: [f64; FEATURE_COUNT]) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    /// Fit by least squares.
    ///
    /// Columns are mean-centred before forming the normal equations so the
    /// intercept drops out of the linear system. A column with no variance
    /// receives a zero coefficient; any other rank deficiency is an error.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::NotEnoughRows`] when there are fewer rows than
    /// parameters, and [`FitError::Singular`] when the features are
    /// collinear.
    pub fn fit(features: &[FeatureVector], targets: &[f64]) -> Result<Self, FitError> {
        let rows = features.len().min(targets.len());
        if rows <= FEATURE_COUNT {
            return Err(FitError::NotEnoughRows {
                required: FEATURE_COUNT + 1,
                actual: rows,
            });
        }

        let mut design = Array2::<f64>::zeros((rows, FEATURE_COUNT));
        for (mut row, vector) in design.outer_iter_mut().zip(features) {
            row.assign(&Array1::from(vector.0.to_vec()));
        }
        let response = Array1::from(targets.iter().take(rows).copied().collect::<Vec<_>>());

        let (Some(feature_means), Some(target_mean)) =
            (design.mean_axis(Axis(0)), response.mean())
        else {
            return Err(FitError::NotEnoughRows {
                required: FEATURE_COUNT + 1,
                actual: rows,
            });
        };

        let centred = &design - &feature_means;
        let centred_response = &response - target_mean;
        let gram = centred.t().dot(&centred);
        let moments = centred.t().dot(&centred_response);

        let coefficients = solve_normal_equations(gram, moments)?;
        let intercept = target_mean
            - coefficients
                .iter()
                .zip(feature_means.iter())
                .map(|(coefficient, mean)| coefficient * mean)
                .sum::<f64>();

        Ok(Self {
            intercept,
            coefficients,
        })
    }

    /// Evaluate the model at one input.
    #[must_use]
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.0.iter())
                .map(|(coefficient, value)| coefficient * value)
                .sum::<f64>()
    }

    /// Constant term.
    #[must_use]
    pub const fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Per-feature weights in [`FEATURE_NAMES`] order.
    #[must_use]
    pub const fn coefficients(&self) -> &[f64; FEATURE_COUNT] {
        &self.coefficients
    }
}

/// Solve `gram · x = moments` by Gaussian elimination with partial pivoting.
fn solve_normal_equations(
    mut gram: Array2<f64>,
    mut moments: Array1<f64>,
) -> Result<[f64; FEATURE_COUNT], FitError> {
    // Constant columns become `1 · x = 0`.
    for column in 0..FEATURE_COUNT {
        if gram[[column, column]] <= ZERO_VARIANCE {
            gram.row_mut(column).fill(0.0);
            gram.column_mut(column).fill(0.0);
            gram[[column, column]] = 1.0;
            moments[column] = 0.0;
        }
    }

    let scale = gram
        .diag()
        .iter()
        .fold(0.0_f64, |largest, value| largest.max(value.abs()));
    let threshold = scale * PIVOT_TOLERANCE;

    for column in 0..FEATURE_COUNT {
        let pivot_row = (column..FEATURE_COUNT)
            .max_by(|&a, &b| gram[[a, column]].abs().total_cmp(&gram[[b, column]].abs()))
            .unwrap_or(column);
        if gram[[pivot_row, column]].abs() <= threshold {
            return Err(FitError::Singular {
                feature: FEATURE_NAMES.get(column).copied().unwrap_or("unknown"),
            });
        }
        if pivot_row != column {
            for k in 0..FEATURE_COUNT {
                gram.swap([column, k], [pivot_row, k]);
            }
            moments.swap(column, pivot_row);
        }

        let pivot = gram[[column, column]];
        for row in (column + 1)..FEATURE_COUNT {
            let factor = gram[[row, column]] / pivot;
            if factor == 0.0 {
                continue;
            }
            for k in column..FEATURE_COUNT {
                let delta = factor * gram[[column, k]];
                gram[[row, k]] -= delta;
            }
            let delta = factor * moments[column];
            moments[row] -= delta;
        }
    }

    let mut solution = [0.0_f64; FEATURE_COUNT];
    for row in (0..FEATURE_COUNT).rev() {
        let known = ((row + 1)..FEATURE_COUNT)
            .map(|k| gram[[row, k]] * solution[k])
            .sum::<f64>();
        solution[row] = (moments[row] - known) / gram[[row, row]];
    }
    Ok(solution)
}
