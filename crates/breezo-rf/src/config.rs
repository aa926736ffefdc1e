use crate::dataset::TrainingSet;
use crate::error::RfError;
use crate::forest::{self, RandomForest};
use crate::split::SplitCriterion;
use crate::tree::DecisionTreeConfig;

/// How many candidate features each split examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// `floor(sqrt(n_features))`, at least 1. The usual choice for classification.
    Sqrt,
    /// `floor(log2(n_features))`, at least 1.
    Log2,
    Count(usize),
    All,
}

impl MaxFeatures {
    /// The concrete count for a matrix `n_features` wide.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidMaxFeatures`] when the count falls outside
    /// `1..=n_features`.
    pub fn resolve(self, n_features: usize) -> Result<usize, RfError> {
        let width = n_features as f64;
        let count = match self {
            MaxFeatures::Sqrt => width.sqrt().floor().max(1.0) as usize,
            MaxFeatures::Log2 => width.log2().floor().max(1.0) as usize,
            MaxFeatures::Count(n) => n,
            MaxFeatures::All => n_features,
        };
        if !(1..=n_features).contains(&count) {
            return Err(RfError::InvalidMaxFeatures {
                max_features: count,
                n_features,
            });
        }
        Ok(count)
    }
}

/// Settings for a bagged forest of CART trees.
///
/// Every tree is grown from the same [`DecisionTreeConfig`] template on its
/// own bootstrap draw of `n_samples` rows. Out of the box: square-root
/// feature sampling, Gini impurity, fully grown trees, seed 42.
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    n_trees: usize,
    max_features: MaxFeatures,
    seed: u64,
    tree: DecisionTreeConfig,
}

impl RandomForestConfig {
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, RfError> {
        if n_trees == 0 {
            return Err(RfError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            seed: 42,
            tree: DecisionTreeConfig::new(),
        })
    }

    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Seeds the per-tree seeds; equal seeds give identical forests.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replace the tree template wholesale. Its own seed and
    /// `max_features` are overridden per tree.
    #[must_use]
    pub fn with_tree(mut self, tree: DecisionTreeConfig) -> Self {
        self.tree = tree;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.tree = self.tree.with_max_depth(max_depth);
        self
    }

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.tree = self.tree.with_criterion(criterion);
        self
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn tree(&self) -> &DecisionTreeConfig {
        &self.tree
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.tree.max_depth()
    }

    /// Validate the matrix and grow the forest on every row.
    ///
    /// `labels` hold class indices below `n_classes`; every probability
    /// vector the forest returns is `n_classes` wide even when some classes
    /// never occur in `labels`.
    ///
    /// # Errors
    ///
    /// Any [`TrainingSet::new`] error, [`RfError::InvalidMaxFeatures`], or
    /// an invalid tree template setting.
    pub fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
        feature_names: &[String],
    ) -> Result<RandomForest, RfError> {
        let data = TrainingSet::new(features, labels, n_classes)?;
        self.fit_rows(&data, &data.all_rows(), feature_names)
    }

    /// Grow the forest on a subset of an already validated set.
    ///
    /// # Errors
    ///
    /// [`RfError::EmptyDataset`] when `rows` is empty, plus the
    /// [`RandomForestConfig::fit`] setting errors.
    pub fn fit_rows(
        &self,
        data: &TrainingSet<'_>,
        rows: &[usize],
        feature_names: &[String],
    ) -> Result<RandomForest, RfError> {
        forest::grow(self, data, rows, feature_names)
    }
}
