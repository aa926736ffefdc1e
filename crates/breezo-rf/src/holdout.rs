//! Shuffled train/test holdout evaluation.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::confusion::ConfusionMatrix;
use crate::dataset::TrainingSet;
use crate::error::RfError;

/// A seeded shuffled split of a dataset into train and test parts.
///
/// The test side holds `ceil(n * test_fraction)` samples; the rest train.
#[derive(Debug, Clone, Copy)]
pub struct HoldoutSplit {
    test_fraction: f64,
    seed: u64,
}

/// Outcome of fitting on the train part and scoring the test part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldoutResult {
    pub accuracy: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub n_train: usize,
    pub n_test: usize,
}

impl HoldoutSplit {
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTestFraction`] unless `0 < test_fraction < 1`.
    pub fn new(test_fraction: f64) -> Result<Self, RfError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(RfError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            seed: 42,
        })
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Shuffle `0..n_samples` and return `(train, test)` index sets.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::TooFewSamplesForHoldout`] when either side would be empty.
    pub fn indices(&self, n_samples: usize) -> Result<(Vec<usize>, Vec<usize>), RfError> {
        let n_test = (n_samples as f64 * self.test_fraction).ceil() as usize;
        if n_test == 0 || n_test >= n_samples {
            return Err(RfError::TooFewSamplesForHoldout {
                n_samples,
                fraction: self.test_fraction,
            });
        }
        let mut order: Vec<usize> = (0..n_samples).collect();
        order.shuffle(&mut ChaCha8Rng::seed_from_u64(self.seed));
        let train = order.split_off(n_test);
        Ok((train, order))
    }

    /// Fit `config` on the train part and score predictions on the test part.
    ///
    /// The forest is told about all `n_classes`, so classes missing from the
    /// train part still get a row and column in the confusion matrix.
    ///
    /// # Errors
    ///
    /// Propagates split errors and any error from [`RandomForestConfig::fit`].
    #[instrument(skip_all, fields(n_samples = features.len(), test_fraction = self.test_fraction))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
        feature_names: &[String],
    ) -> Result<HoldoutResult, RfError> {
        let data = TrainingSet::new(features, labels, n_classes)?;
        let (train, test) = self.indices(data.n_samples())?;

        let forest = config.fit_rows(&data, &train, feature_names)?;
        let predicted = test
            .iter()
            .map(|&i| forest.predict(data.row(i)))
            .collect::<Result<Vec<_>, _>>()?;
        let actual: Vec<usize> = test.iter().map(|&i| data.label(i)).collect();
        let confusion_matrix = ConfusionMatrix::from_labels(&actual, &predicted, n_classes)?;
        let accuracy = confusion_matrix.accuracy();

        info!(
            n_train = train.len(),
            n_test = test.len(),
            accuracy,
            "holdout evaluation complete"
        );

        Ok(HoldoutResult {
            accuracy,
            confusion_matrix,
            n_train: train.len(),
            n_test: test.len(),
        })
    }
}
