//! Bagged CART forests with per-class probability estimates.
//!
//! Trees are grown in parallel with rayon from seeded ChaCha streams, so a
//! forest is reproducible from its seed. A [`HoldoutSplit`] scores a config on
//! a shuffled test part, and fitted forests serialize with serde.

mod config;
mod confusion;
mod dataset;
mod error;
mod forest;
mod holdout;
mod node;
mod predict;
mod split;
mod tree;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use dataset::TrainingSet;
pub use error::RfError;
pub use forest::RandomForest;
pub use holdout::{HoldoutResult, HoldoutSplit};
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
