//! Top-K ranking of class probabilities into named diagnoses.

use serde::{Deserialize, Serialize};

use crate::codec::LabelCodec;
use crate::error::FeatureError;

/// Number of diagnoses returned when the caller does not say otherwise.
pub const DEFAULT_TOP_K: usize = 5;

/// A disease name with its probability rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedDiagnosis {
    pub disease: String,
    pub probability: f64,
}

/// Indices of the `k` most probable classes, highest first.
///
/// Equal probabilities keep ascending index order. Returns `min(k, len)`
/// indices.
#[must_use]
pub fn top_k(probabilities: &[f64], k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
    order.truncate(k);
    order
}

/// Decode the `k` most probable classes and round their probabilities.
///
/// Probabilities are not renormalized, so the result may sum to less than 1.
///
/// # Errors
///
/// Returns [`FeatureError::UnknownClassIndex`] when `probabilities` is wider
/// than `diseases`.
pub fn rank_diseases(
    probabilities: &[f64],
    diseases: &LabelCodec,
    k: usize,
) -> Result<Vec<RankedDiagnosis>, FeatureError> {
    top_k(probabilities, k)
        .into_iter()
        .map(|index| {
            Ok(RankedDiagnosis {
                disease: diseases.decode(index)?.to_string(),
                probability: round_to_cents(probabilities[index]),
            })
        })
        .collect()
}

/// Round the exact binary value to two decimals, as `{:.2}` prints it.
/// `0.015` is stored just below the half and becomes `0.01`.
fn round_to_cents(p: f64) -> f64 {
    format!("{p:.2}").parse().unwrap_or(p)
}
