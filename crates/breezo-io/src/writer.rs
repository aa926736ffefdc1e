//! JSON writer for the training run report.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::domain::CleaningSummary;
use crate::IoError;

/// File name of the report inside the artifact directory.
pub const REPORT_FILE: &str = "training_report.json";

/// Summary of one training run.
///
/// Built from primitives so this crate stays independent of the model crates.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub run_id: String,
    pub data_path: String,
    pub cleaning: CleaningSummary,
    pub n_classes: usize,
    pub n_features: usize,
    pub vocabulary_size: usize,
    pub n_trees: usize,
    pub seed: u64,
    /// Highest-importance columns of the final forest.
    pub top_features: Vec<FeatureWeight>,
    /// Absent when training ran without a holdout split.
    pub holdout: Option<HoldoutReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureWeight {
    pub feature: String,
    pub importance: f64,
}

/// Holdout accuracy with a per-disease breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct HoldoutReport {
    pub n_train: usize,
    pub n_test: usize,
    pub accuracy: f64,
    pub classes: Vec<ClassReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassReport {
    pub disease: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Writes run reports into an output directory, creating it if needed.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Write `report` as pretty JSON to [`REPORT_FILE`] and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all, fields(run_id = %report.run_id))]
    pub fn write_training(&self, report: &TrainingReport) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), "training report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn report(holdout: Option<HoldoutReport>) -> TrainingReport {
        TrainingReport {
            run_id: "run-1".to_string(),
            data_path: "data/respiratory.csv".to_string(),
            cleaning: CleaningSummary {
                rows_read: 10,
                rows_dropped: 1,
                symptoms_filled: 2,
                sex_filled: 0,
                age_filled: 3,
                median_age: 41.0,
            },
            n_classes: 2,
            n_features: 12,
            vocabulary_size: 10,
            n_trees: 100,
            seed: 42,
            top_features: vec![FeatureWeight {
                feature: "wheezing".to_string(),
                importance: 0.4,
            }],
            holdout,
        }
    }

    #[test]
    fn writes_report_with_holdout() {
        let dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(dir.path()).unwrap();
        let path = writer
            .write_training(&report(Some(HoldoutReport {
                n_train: 7,
                n_test: 2,
                accuracy: 0.5,
                classes: vec![ClassReport {
                    disease: "Asthma".to_string(),
                    precision: 1.0,
                    recall: 0.5,
                    f1: 2.0 / 3.0,
                    support: 2,
                }],
            })))
            .unwrap();

        assert_eq!(path, dir.path().join(REPORT_FILE));
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["run_id"], "run-1");
        assert_eq!(json["cleaning"]["rows_dropped"], 1);
        assert_eq!(json["holdout"]["accuracy"], 0.5);
        assert_eq!(json["holdout"]["classes"][0]["disease"], "Asthma");
        assert_eq!(json["top_features"][0]["feature"], "wheezing");
    }

    #[test]
    fn holdout_serializes_as_null_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = ReportWriter::new(dir.path())
            .unwrap()
            .write_training(&report(None))
            .unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(json["holdout"].is_null());
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        ReportWriter::new(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
