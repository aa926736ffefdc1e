//! Validated borrowed view over a row-major training matrix.

use crate::error::RfError;

/// Feature rows plus class labels, checked once and then shared by every
/// tree of a forest.
///
/// Trees train on a list of row indices into this view (a bootstrap draw or
/// a holdout part) instead of on copied rows.
#[derive(Debug, Clone, Copy)]
pub struct TrainingSet<'a> {
    features: &'a [Vec<f64>],
    labels: &'a [usize],
    n_classes: usize,
    n_features: usize,
}

impl<'a> TrainingSet<'a> {
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | no rows |
    /// | [`RfError::ZeroClasses`] | `n_classes == 0` |
    /// | [`RfError::LabelCountMismatch`] | one label per row is not satisfied |
    /// | [`RfError::ZeroFeatures`] | rows are empty |
    /// | [`RfError::FeatureCountMismatch`] | rows differ in width |
    /// | [`RfError::LabelOutOfRange`] | a label is `>= n_classes` |
    /// | [`RfError::NonFiniteValue`] | a value is NaN or infinite |
    pub fn new(
        features: &'a [Vec<f64>],
        labels: &'a [usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        let Some(first) = features.first() else {
            return Err(RfError::EmptyDataset);
        };
        if n_classes == 0 {
            return Err(RfError::ZeroClasses);
        }
        if labels.len() != features.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: features.len(),
                n_labels: labels.len(),
            });
        }
        let n_features = first.len();
        if n_features == 0 {
            return Err(RfError::ZeroFeatures);
        }

        if let Some((sample_index, row)) = features
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != n_features)
        {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some((sample_index, &label)) =
            labels.iter().enumerate().find(|&(_, &l)| l >= n_classes)
        {
            return Err(RfError::LabelOutOfRange {
                sample_index,
                label,
                n_classes,
            });
        }
        if let Some((sample_index, feature_index)) =
            features.iter().enumerate().find_map(|(i, row)| {
                row.iter().position(|v| !v.is_finite()).map(|j| (i, j))
            })
        {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }

        Ok(Self {
            features,
            labels,
            n_classes,
            n_features,
        })
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.features.len()
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
    pub fn row(&self, index: usize) -> &'a [f64] {
        &self.features[index]
    }

    #[must_use]
    pub fn label(&self, index: usize) -> usize {
        self.labels[index]
    }

    /// Indices `0..n_samples`.
    #[must_use]
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.n_samples()).collect()
    }

    /// Column-major copy of `rows`, in the order given (duplicates kept).
    pub(crate) fn columns(&self, rows: &[usize]) -> Vec<Vec<f64>> {
        (0..self.n_features)
            .map(|f| rows.iter().map(|&r| self.features[r][f]).collect())
            .collect()
    }

    pub(crate) fn labels_of(&self, rows: &[usize]) -> Vec<usize> {
        rows.iter().map(|&r| self.labels[r]).collect()
    }
}
