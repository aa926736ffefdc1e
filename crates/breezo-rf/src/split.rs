//! Split criteria and exhaustive threshold search for CART nodes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// An empty node is pure.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::PURE;
        }
        let total = n_samples as f64;
        let proportions = class_counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| c as f64 / total);
        let value = match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        };
        Impurity::new(value)
    }
}

/// The chosen split for a node, with the partitioned sample indices.
#[derive(Debug, Clone)]
pub(crate) struct Split {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) gain: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Outcome of scanning one feature column at one node.
enum Scan {
    /// Every sample at the node shares the same value.
    Constant,
    /// The best `(threshold, gain)` for the feature, if any boundary
    /// satisfies `min_samples_leaf`.
    Evaluated(Option<(f64, f64)>),
}

/// Best-split search over a column-major feature matrix.
///
/// `columns[feature][sample]` holds the training values; sample indices
/// passed to [`SplitSearch::best_split`] index into the inner vectors.
pub(crate) struct SplitSearch<'a> {
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Find the split with the largest weighted impurity decrease.
    ///
    /// Features are visited in random order until `max_features` non-constant
    /// features have been evaluated. Constant features do not count towards
    /// the budget, which matters for sparse text columns where most terms are
    /// absent from any given node.
    ///
    /// Returns `None` when no feature admits a valid boundary.
    pub(crate) fn best_split(
        &self,
        samples: &[usize],
        parent_counts: &[usize],
        rng: &mut impl Rng,
    ) -> Option<Split> {
        if samples.len() < 2 {
            return None;
        }
        let parent_impurity = self.criterion.impurity(parent_counts, samples.len()).value();

        let n_features = self.columns.len();
        let mut order: Vec<usize> = (0..n_features).collect();
        let mut evaluated = 0usize;
        let mut best: Option<(FeatureIndex, f64, f64)> = None;

        for i in 0..n_features {
            if evaluated == self.max_features {
                break;
            }
            // Lazy Fisher-Yates: only shuffle as far as we actually visit.
            let j = rng.gen_range(i..n_features);
            order.swap(i, j);
            let feature = order[i];

            match self.scan(&self.columns[feature], samples, parent_counts, parent_impurity) {
                Scan::Constant => continue,
                Scan::Evaluated(candidate) => {
                    evaluated += 1;
                    if let Some((threshold, gain)) = candidate
                        && best.is_none_or(|(_, _, best_gain)| gain > best_gain)
                    {
                        best = Some((FeatureIndex::new(feature), threshold, gain));
                    }
                }
            }
        }

        let (feature, threshold, gain) = best?;
        let column = &self.columns[feature.index()];
        let (left, right): (Vec<usize>, Vec<usize>) =
            samples.iter().partition(|&&s| column[s] <= threshold);

        Some(Split {
            feature,
            threshold,
            gain,
            left,
            right,
        })
    }

    /// Sort the node's samples by one feature and scan every boundary
    /// between distinct values, updating class counts incrementally.
    fn scan(
        &self,
        column: &[f64],
        samples: &[usize],
        parent_counts: &[usize],
        parent_impurity: f64,
    ) -> Scan {
        let mut pairs: Vec<(f64, usize)> = samples
            .iter()
            .map(|&s| (column[s], self.labels[s]))
            .collect();
        pairs.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        let n = pairs.len();
        if pairs[0].0 == pairs[n - 1].0 {
            return Scan::Constant;
        }

        let mut left_counts = vec![0usize; self.n_classes];
        let mut right_counts = parent_counts.to_vec();
        let mut best: Option<(f64, f64)> = None;

        for i in 0..n - 1 {
            let (value, label) = pairs[i];
            left_counts[label] += 1;
            right_counts[label] -= 1;

            let next = pairs[i + 1].0;
            if value == next {
                continue;
            }
            let n_left = i + 1;
            let n_right = n - n_left;
            if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                continue;
            }

            let gain = n as f64 * parent_impurity
                - n_left as f64 * self.criterion.impurity(&left_counts, n_left).value()
                - n_right as f64 * self.criterion.impurity(&right_counts, n_right).value();

            if best.is_none_or(|(_, best_gain)| gain > best_gain) {
                let mut threshold = (value + next) / 2.0;
                // Adjacent floats can round the midpoint up to `next`.
                if threshold >= next {
                    threshold = value;
                }
                best = Some((threshold, gain));
            }
        }

        Scan::Evaluated(best)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn counts(labels: &[usize], n_classes: usize) -> Vec<usize> {
        let mut c = vec![0; n_classes];
        for &l in labels {
            c[l] += 1;
        }
        c
    }

    fn search<'a>(
        columns: &'a [Vec<f64>],
        labels: &'a [usize],
        max_features: usize,
        min_samples_leaf: usize,
    ) -> SplitSearch<'a> {
        SplitSearch {
            columns,
            labels,
            n_classes: 2,
            criterion: SplitCriterion::Gini,
            max_features,
            min_samples_leaf,
        }
    }

    #[test]
    fn gini_values() {
        assert!(SplitCriterion::Gini.impurity(&[10, 0, 0], 10).is_pure());
        let balanced = SplitCriterion::Gini.impurity(&[5, 5], 10).value();
        assert!((balanced - 0.5).abs() < f64::EPSILON);
        let uniform = SplitCriterion::Gini.impurity(&[100, 100, 100], 300).value();
        assert!((uniform - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn entropy_values() {
        assert!(SplitCriterion::Entropy.impurity(&[10, 0, 0], 10).is_pure());
        let balanced = SplitCriterion::Entropy.impurity(&[5, 5], 10).value();
        assert!((balanced - 2.0_f64.ln()).abs() < 1e-10);
    }

    #[test]
    fn empty_node_is_pure() {
        assert!(SplitCriterion::Gini.impurity(&[0, 0], 0).is_pure());
    }

    #[test]
    fn separable_data_finds_midpoint() {
        let columns = vec![vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let samples: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = search(&columns, &labels, 1, 1)
            .best_split(&samples, &counts(&labels, 2), &mut rng)
            .expect("should find a split");

        assert_eq!(split.feature.index(), 0);
        assert!((split.threshold - 6.5).abs() < f64::EPSILON);
        assert_eq!(split.left, vec![0, 1, 2]);
        assert_eq!(split.right, vec![3, 4, 5]);
        assert!(split.gain > 0.0);
    }

    #[test]
    fn constant_feature_returns_none() {
        let columns = vec![vec![5.0, 5.0, 5.0, 5.0]];
        let labels = vec![0, 0, 1, 1];
        let samples: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = search(&columns, &labels, 1, 1).best_split(
            &samples,
            &counts(&labels, 2),
            &mut rng,
        );
        assert!(split.is_none());
    }

    #[test]
    fn min_samples_leaf_enforced() {
        // Each child would hold a single sample, below the minimum of 2.
        let columns = vec![vec![1.0, 10.0]];
        let labels = vec![0, 1];
        let samples: Vec<usize> = (0..2).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = search(&columns, &labels, 1, 2).best_split(
            &samples,
            &counts(&labels, 2),
            &mut rng,
        );
        assert!(split.is_none());
    }

    #[test]
    fn constant_features_do_not_consume_budget() {
        // Only the last of five features varies; with a budget of one feature
        // the search must still reach it.
        let mut columns = vec![vec![0.0; 6]; 4];
        columns.push(vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0]);
        let labels = vec![0, 0, 0, 1, 1, 1];
        let samples: Vec<usize> = (0..6).collect();

        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let split = search(&columns, &labels, 1, 1)
                .best_split(&samples, &counts(&labels, 2), &mut rng)
                .expect("informative feature should be reached");
            assert_eq!(split.feature.index(), 4);
        }
    }
}
