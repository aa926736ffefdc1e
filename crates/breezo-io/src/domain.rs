//! Domain types for breezo-io.

use serde::Serialize;

/// Sentinel written into missing Symptoms and Sex cells.
pub const UNKNOWN: &str = "unknown";

/// One CSV row before cleaning. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRecord {
    pub disease: Option<String>,
    pub symptoms: Option<String>,
    pub age: Option<f64>,
    pub sex: Option<String>,
}

/// One cleaned training row; every field is populated.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRecord {
    pub disease: String,
    pub symptoms: String,
    pub age: f64,
    pub sex: String,
}

/// What cleaning changed, for logging and the training report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningSummary {
    pub rows_read: usize,
    /// Rows discarded because Disease was missing.
    pub rows_dropped: usize,
    pub symptoms_filled: usize,
    pub sex_filled: usize,
    pub age_filled: usize,
    /// Median of the present ages among kept rows.
    pub median_age: f64,
}

/// Training rows with no missing values, in file order.
#[derive(Debug, Clone)]
pub struct CleanedDataset {
    records: Vec<TrainingRecord>,
    summary: CleaningSummary,
}

impl CleanedDataset {
    pub(crate) fn new(records: Vec<TrainingRecord>, summary: CleaningSummary) -> Self {
        Self { records, summary }
    }

    pub fn records(&self) -> &[TrainingRecord] {
        &self.records
    }

    pub fn summary(&self) -> &CleaningSummary {
        &self.summary
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
