//! Seeded train/test partitioning.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

use crate::error::FitError;
use crate::regression::FEATURE_COUNT;

/// Fewest training rows that still determine every coefficient and the
/// intercept.
pub const MIN_TRAIN_ROWS: usize = FEATURE_COUNT + 1;

/// Row indices assigned to each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl TrainTestSplit {
    /// Indices used for fitting.
    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Indices held out for scoring.
    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }
}

/// Shuffle `0..rows` with `seed` and hold out `ceil(rows * test_fraction)`
/// indices for testing.
///
/// The same `rows`, `test_fraction` and `seed` always produce the same split.
///
/// # Errors
///
/// Returns [`FitError::InvalidTestFraction`] unless `0 < test_fraction < 1`,
/// and [`FitError::NotEnoughRows`] when either partition would be empty or
/// the training partition would hold fewer than [`MIN_TRAIN_ROWS`] rows.
///
/// # Examples
///
/// ```
/// use calorie_model::train_test_split;
///
/// let split = train_test_split(10, 0.2, 2).expect("valid split");
/// assert_eq!(split.test().len(), 2);
/// assert_eq!(split.train().len(), 8);
/// ```
pub fn train_test_split(
    rows: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, FitError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(FitError::InvalidTestFraction {
            fraction: test_fraction,
        });
    }
    let test_len = held_out_len(rows, test_fraction);
    let train_len = rows.saturating_sub(test_len);
    if test_len == 0 || train_len < MIN_TRAIN_ROWS {
        return Err(FitError::NotEnoughRows {
            required: MIN_TRAIN_ROWS,
            actual: train_len,
        });
    }

    let mut indices: Vec<usize> = (0..rows).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(test_len);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    reason = "fraction is in (0, 1) so the product lies in [0, rows]"
)]
fn held_out_len(rows: usize, test_fraction: f64) -> usize {
    ((rows as f64) * test_fraction).ceil() as usize
}
