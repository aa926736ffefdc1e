use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    RfError,
    dataset::TrainingSet,
    node::{Node, NodeIndex},
    predict::argmax_first,
    split::{SplitCriterion, SplitSearch},
};

/// Configuration for a single CART decision tree.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    criterion: SplitCriterion,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: Option<usize>,
    seed: u64,
}

impl DecisionTreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }

    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// `None` grows until leaves are pure; `Some(d)` stops at depth `d`
    /// (the root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Number of non-constant features examined per split. `None` means all.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.criterion
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Train a tree on every row, inferring the class count as `max(label) + 1`.
    ///
    /// # Errors
    ///
    /// Any [`TrainingSet::new`] error, plus [`RfError::InvalidMaxDepth`],
    /// [`RfError::InvalidMinSamplesSplit`], [`RfError::InvalidMinSamplesLeaf`]
    /// and [`RfError::InvalidMaxFeatures`] for out-of-range settings.
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        let n_classes = labels.iter().max().map_or(0, |&m| m + 1);
        let data = TrainingSet::new(features, labels, n_classes)?;
        self.fit_rows(&data, &data.all_rows())
    }

    /// Train on the listed rows of `data`; a row listed twice weighs twice.
    ///
    /// Leaf distributions are `data.n_classes()` wide whichever classes the
    /// rows contain.
    #[instrument(skip_all, fields(n_rows = rows.len()))]
    pub(crate) fn fit_rows(
        &self,
        data: &TrainingSet<'_>,
        rows: &[usize],
    ) -> Result<DecisionTree, RfError> {
        if rows.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        let n_features = data.n_features();
        let max_features = self.validate(n_features)?;
        let columns = data.columns(rows);
        let labels = data.labels_of(rows);

        let mut builder = TreeBuilder {
            search: SplitSearch {
                columns: &columns,
                labels: &labels,
                n_classes: data.n_classes(),
                criterion: self.criterion,
                max_features,
                min_samples_leaf: self.min_samples_leaf,
            },
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            rng: ChaCha8Rng::seed_from_u64(self.seed),
            nodes: Vec::new(),
        };
        builder.grow((0..rows.len()).collect(), 0);

        debug!(n_nodes = builder.nodes.len(), "decision tree built");

        Ok(DecisionTree {
            nodes: builder.nodes,
            n_features,
            n_classes: data.n_classes(),
        })
    }

    /// Check the settings against the data width and resolve `max_features`.
    fn validate(&self, n_features: usize) -> Result<usize, RfError> {
        if self.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        if self.min_samples_leaf == 0 {
            return Err(RfError::InvalidMinSamplesLeaf {
                min_samples_leaf: self.min_samples_leaf,
            });
        }
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }
        Ok(max_features)
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first growth into a flat node arena.
struct TreeBuilder<'a> {
    search: SplitSearch<'a>,
    max_depth: Option<usize>,
    min_samples_split: usize,
    rng: ChaCha8Rng,
    nodes: Vec<Node>,
}

impl TreeBuilder<'_> {
    fn grow(&mut self, samples: Vec<usize>, depth: usize) -> NodeIndex {
        let n_samples = samples.len();
        let mut counts = vec![0usize; self.search.n_classes];
        for &s in &samples {
            counts[self.search.labels[s]] += 1;
        }
        let impurity = self.search.criterion.impurity(&counts, n_samples);

        let stop = impurity.is_pure()
            || n_samples < self.min_samples_split
            || self.max_depth.is_some_and(|max| depth >= max);

        let split = if stop {
            None
        } else {
            self.search.best_split(&samples, &counts, &mut self.rng)
        };

        let Some(split) = split else {
            let total = n_samples as f64;
            return self.push(Node::Leaf {
                distribution: counts.iter().map(|&c| c as f64 / total).collect(),
                impurity,
                n_samples,
            });
        };

        // Reserve the slot so the root stays at index 0; children fill in after.
        let at = self.push(Node::Leaf {
            distribution: Vec::new(),
            impurity,
            n_samples,
        });
        let left = self.grow(split.left, depth + 1);
        let right = self.grow(split.right, depth + 1);
        self.nodes[at.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            gain: split.gain,
        };
        at
    }

    fn push(&mut self, node: Node) -> NodeIndex {
        self.nodes.push(node);
        NodeIndex::new(self.nodes.len() - 1)
    }
}

/// A fitted CART decision tree stored as a flat arena rooted at
/// [`NodeIndex::ROOT`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

impl DecisionTree {
    /// Most probable class for one sample; ties go to the lower index.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        self.predict_proba(sample).map(argmax_first)
    }

    /// Class distribution of the leaf `sample` lands in, `n_classes` wide.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<&[f64], RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut at = NodeIndex::ROOT;
        loop {
            match &self.nodes[at.index()] {
                Node::Leaf { distribution, .. } => return Ok(distribution),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    at = if sample[feature.index()] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Mean decrease in impurity per feature, normalized to sum to 1.0.
    ///
    /// All zeros when the tree is a single leaf.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut totals = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split { feature, gain, .. } = node {
                totals[feature.index()] += gain;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Longest root-to-leaf path; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(NodeIndex::ROOT, 0usize)];
        while let Some((at, d)) = stack.pop() {
            match &self.nodes[at.index()] {
                Node::Leaf { .. } => deepest = deepest.max(d),
                Node::Split { left, right, .. } => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
            }
        }
        deepest
    }
}
