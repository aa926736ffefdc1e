//! Configuration builder for a training run.

use breezo_features::DEFAULT_MAX_VOCABULARY;
use breezo_rf::{RandomForestConfig, RfError};

/// Settings for [`DiagnosisModel::train`](crate::DiagnosisModel::train).
///
/// # Defaults
///
/// | Parameter        | Default     |
/// |------------------|-------------|
/// | `n_trees`        | 100         |
/// | `max_depth`      | `None`      |
/// | `max_vocabulary` | 300         |
/// | `test_fraction`  | `Some(0.2)` |
/// | `seed`           | 42          |
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingConfig {
    n_trees: usize,
    max_depth: Option<usize>,
    max_vocabulary: usize,
    test_fraction: Option<f64>,
    seed: u64,
}

impl TrainingConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            max_vocabulary: DEFAULT_MAX_VOCABULARY,
            test_fraction: Some(0.2),
            seed: 42,
        }
    }

    #[must_use]
    pub fn with_n_trees(mut self, n_trees: usize) -> Self {
        self.n_trees = n_trees;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_max_vocabulary(mut self, max_vocabulary: usize) -> Self {
        self.max_vocabulary = max_vocabulary;
        self
    }

    /// Fraction of rows held out for evaluation. `None` skips evaluation.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: Option<f64>) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Seed for the holdout shuffle and the forest.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    #[must_use]
    pub fn max_vocabulary(&self) -> usize {
        self.max_vocabulary
    }

    #[must_use]
    pub fn test_fraction(&self) -> Option<f64> {
        self.test_fraction
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The forest settings implied by this run.
    pub(crate) fn forest_config(&self) -> Result<RandomForestConfig, RfError> {
        Ok(RandomForestConfig::new(self.n_trees)?
            .with_max_depth(self.max_depth)
            .with_seed(self.seed))
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.n_trees(), 100);
        assert_eq!(config.max_depth(), None);
        assert_eq!(config.max_vocabulary(), 300);
        assert_eq!(config.test_fraction(), Some(0.2));
        assert_eq!(config.seed(), 42);
    }

    #[test]
    fn forest_config_carries_settings() {
        let forest = TrainingConfig::new()
            .with_n_trees(7)
            .with_max_depth(Some(3))
            .with_seed(9)
            .forest_config()
            .unwrap();
        assert_eq!(forest.n_trees(), 7);
        assert_eq!(forest.max_depth(), Some(3));
        assert_eq!(forest.seed(), 9);
    }

    #[test]
    fn zero_trees_rejected() {
        let err = TrainingConfig::new().with_n_trees(0).forest_config().unwrap_err();
        assert!(matches!(err, RfError::InvalidTreeCount { n_trees: 0 }));
    }
}
