//! Confusion matrix and per-class classification metrics.

use serde::{Deserialize, Serialize};

use crate::error::RfError;

/// Counts of `(actual, predicted)` class pairs.
///
/// `rows[actual][predicted]` holds the number of samples with true class
/// `actual` that were assigned `predicted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    rows: Vec<Vec<usize>>,
}

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub class: usize,
    /// TP / (TP + FP); 0.0 when the class was never predicted.
    pub precision: f64,
    /// TP / (TP + FN); 0.0 when the class never occurs.
    pub recall: f64,
    pub f1: f64,
    /// Number of samples whose true class is `class`.
    pub support: usize,
}

impl ConfusionMatrix {
    /// An all-zero `n_classes x n_classes` matrix.
    #[must_use]
    pub fn new(n_classes: usize) -> Self {
        Self {
            rows: vec![vec![0; n_classes]; n_classes],
        }
    }

    /// Tally paired true and predicted labels.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | zero labels provided |
    /// | [`RfError::LabelCountMismatch`] | the slices differ in length |
    /// | [`RfError::LabelOutOfRange`] | a label is `>= n_classes` |
    pub fn from_labels(
        actual: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, RfError> {
        if actual.is_empty() {
            return Err(RfError::EmptyDataset);
        }
        if actual.len() != predicted.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: actual.len(),
                n_labels: predicted.len(),
            });
        }
        let mut matrix = Self::new(n_classes);
        for (sample_index, (&a, &p)) in actual.iter().zip(predicted).enumerate() {
            let label = a.max(p);
            if label >= n_classes {
                return Err(RfError::LabelOutOfRange {
                    sample_index,
                    label,
                    n_classes,
                });
            }
            matrix.rows[a][p] += 1;
        }
        Ok(matrix)
    }

    /// Fraction of samples on the diagonal; 0.0 for an empty matrix.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = self.rows.iter().enumerate().map(|(i, row)| row[i]).sum();
        correct as f64 / total as f64
    }

    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        (0..self.n_classes())
            .map(|c| {
                let tp = self.rows[c][c];
                let support: usize = self.rows[c].iter().sum();
                let predicted: usize = self.rows.iter().map(|row| row[c]).sum();
                let precision = ratio(tp, predicted);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.rows
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.rows.len()
    }

    /// Total number of tallied samples.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rows.iter().flatten().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_predictions() {
        let labels = [0, 1, 2, 0, 1, 2];
        let cm = ConfusionMatrix::from_labels(&labels, &labels, 3).unwrap();
        assert!((cm.accuracy() - 1.0).abs() < f64::EPSILON);
        assert_eq!(cm.total(), 6);
        for m in cm.class_metrics() {
            assert!((m.f1 - 1.0).abs() < f64::EPSILON);
            assert_eq!(m.support, 2);
        }
    }

    #[test]
    fn counts_land_in_actual_predicted_cells() {
        let actual = [0, 0, 1, 1];
        let predicted = [0, 1, 1, 1];
        let cm = ConfusionMatrix::from_labels(&actual, &predicted, 2).unwrap();
        assert_eq!(cm.as_rows(), &[vec![1, 1], vec![0, 2]]);
        assert!((cm.accuracy() - 0.75).abs() < f64::EPSILON);

        let metrics = cm.class_metrics();
        assert!((metrics[0].precision - 1.0).abs() < f64::EPSILON);
        assert!((metrics[0].recall - 0.5).abs() < f64::EPSILON);
        assert!((metrics[1].precision - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn absent_class_has_zero_metrics() {
        let cm = ConfusionMatrix::from_labels(&[0, 0], &[0, 0], 3).unwrap();
        let absent = &cm.class_metrics()[2];
        assert_eq!(absent.support, 0);
        assert_eq!(absent.precision, 0.0);
        assert_eq!(absent.f1, 0.0);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[], &[], 2),
            Err(RfError::EmptyDataset)
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 1], &[0], 2),
            Err(RfError::LabelCountMismatch { .. })
        ));
        assert!(matches!(
            ConfusionMatrix::from_labels(&[0, 3], &[0, 1], 2),
            Err(RfError::LabelOutOfRange { sample_index: 1, label: 3, .. })
        ));
    }
}
