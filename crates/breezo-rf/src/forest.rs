//! Bagged ensemble of CART trees, grown in parallel.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::dataset::TrainingSet;
use crate::error::RfError;
use crate::tree::DecisionTree;

/// A fitted forest. Immutable once grown.
///
/// [`RandomForest::predict_proba`] averages the leaf distributions of all
/// trees, so probabilities always sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

#[instrument(skip_all, fields(n_trees = config.n_trees(), n_rows = rows.len()))]
pub(crate) fn grow(
    config: &RandomForestConfig,
    data: &TrainingSet<'_>,
    rows: &[usize],
    feature_names: &[String],
) -> Result<RandomForest, RfError> {
    if rows.is_empty() {
        return Err(RfError::EmptyDataset);
    }
    let max_features = config.max_features().resolve(data.n_features())?;
    info!(
        n_features = data.n_features(),
        n_classes = data.n_classes(),
        max_features,
        "growing random forest"
    );

    // Seeds are drawn up front so the result does not depend on rayon's scheduling.
    let mut seeder = ChaCha8Rng::seed_from_u64(config.seed());
    let seeds: Vec<u64> = (0..config.n_trees()).map(|_| seeder.r#gen()).collect();

    let trees = seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let draw: Vec<usize> = (0..rows.len())
                .map(|_| rows[rng.gen_range(0..rows.len())])
                .collect();
            config
                .tree()
                .clone()
                .with_max_features(Some(max_features))
                .with_seed(rng.r#gen())
                .fit_rows(data, &draw)
        })
        .collect::<Result<Vec<_>, _>>()?;

    info!(n_trees = trees.len(), "random forest grown");

    Ok(RandomForest {
        trees,
        n_features: data.n_features(),
        n_classes: data.n_classes(),
        feature_names: feature_names.to_vec(),
    })
}
