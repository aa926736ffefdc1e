//! Ensemble prediction: probability averaging across trees.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;

/// Index of the largest value; the first wins on ties. Returns 0 for an
/// empty slice.
pub(crate) fn argmax_first(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Averaged class probabilities for one sample, one entry per class index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// The class with the highest probability (lowest index on ties).
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        argmax_first(&self.probs)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.probs
    }
}

impl RandomForest {
    /// Most probable class for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.predict_proba(sample)?.predicted_class())
    }

    /// Mean of the leaf distributions reached in every tree.
    ///
    /// The result has `n_classes` entries and sums to 1.0 up to rounding.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut sum = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(sample)?) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        sum.iter_mut().for_each(|p| *p /= n_trees);
        Ok(ClassDistribution::new(sum))
    }

    /// [`RandomForest::predict`] over many samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first [`RfError::PredictionFeatureMismatch`] encountered.
    pub fn predict_batch(&self, samples: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        samples.par_iter().map(|s| self.predict(s)).collect()
    }

    /// [`RandomForest::predict_proba`] over many samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns the first [`RfError::PredictionFeatureMismatch`] encountered.
    pub fn predict_proba_batch(
        &self,
        samples: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, RfError> {
        samples.par_iter().map(|s| self.predict_proba(s)).collect()
    }

    /// Mean decrease in impurity averaged over trees, one entry per feature.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for tree in &self.trees {
            for (acc, v) in totals.iter_mut().zip(tree.feature_importances()) {
                *acc += v;
            }
        }
        let n_trees = self.trees.len() as f64;
        totals.iter_mut().for_each(|v| *v /= n_trees);
        totals
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn trees(&self) -> &[crate::tree::DecisionTree] {
        &self.trees
    }
}
