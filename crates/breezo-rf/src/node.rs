use std::fmt;

use serde::{Deserialize, Serialize};

/// Column of the encoded feature matrix a split tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f{}", self.0)
    }
}

/// Position of a node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// The root always occupies the first arena slot.
    pub const ROOT: NodeIndex = NodeIndex(0);

    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node impurity under the configured criterion (Gini or Entropy).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) const PURE: Impurity = Impurity(0.0);

    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whether the node holds a single class.
    #[must_use]
    pub fn is_pure(self) -> bool {
        self.0 <= 0.0
    }
}

/// One slot of a tree's arena.
///
/// Children are [`NodeIndex`] positions in the same `Vec<Node>`, so a tree
/// serializes as plain data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    /// Interior node: samples with `value <= threshold` go left.
    Split {
        /// Feature tested at this node.
        feature: FeatureIndex,
        /// Decision boundary (midpoint between two observed values).
        threshold: f64,
        /// Left child.
        left: NodeIndex,
        /// Right child.
        right: NodeIndex,
        /// Sample-weighted impurity decrease achieved by the split.
        gain: f64,
    },
    /// Terminal node carrying the class distribution of its training samples.
    Leaf {
        /// Class frequencies normalized to sum to 1.0, one entry per class.
        distribution: Vec<f64>,
        /// Impurity of the samples that reached the leaf.
        impurity: Impurity,
        /// Number of training samples that reached the leaf.
        n_samples: usize,
    },
}

impl Node {
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Class frequencies of a leaf; `None` for a split.
    #[must_use]
    pub fn distribution(&self) -> Option<&[f64]> {
        match self {
            Node::Leaf { distribution, .. } => Some(distribution),
            Node::Split { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_expose_position() {
        assert_eq!(FeatureIndex::new(7).index(), 7);
        assert_eq!(NodeIndex::new(42).index(), 42);
        assert_eq!(NodeIndex::ROOT.index(), 0);
    }

    #[test]
    fn display_formats() {
        assert_eq!(FeatureIndex::new(3).to_string(), "f3");
        assert_eq!(NodeIndex::new(9).to_string(), "#9");
    }

    #[test]
    fn impurity_purity() {
        assert!(Impurity::PURE.is_pure());
        assert!(!Impurity::new(0.5).is_pure());
        assert!(Impurity::new(0.1) < Impurity::new(0.5));
    }

    #[test]
    fn leaf_exposes_distribution() {
        let leaf = Node::Leaf {
            distribution: vec![0.25, 0.75],
            impurity: Impurity::new(0.375),
            n_samples: 4,
        };
        assert!(leaf.is_leaf());
        assert_eq!(leaf.distribution(), Some(&[0.25, 0.75][..]));
    }

    #[test]
    fn split_has_no_distribution() {
        let split = Node::Split {
            feature: FeatureIndex::new(1),
            threshold: 0.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            gain: 1.2,
        };
        assert!(!split.is_leaf());
        assert!(split.distribution().is_none());
    }
}
