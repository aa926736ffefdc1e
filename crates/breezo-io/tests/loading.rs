//! Integration tests: fixture CSV -> cleaned dataset -> training report.

use std::fs;
use std::path::{Path, PathBuf};

use breezo_io::{
    DatasetReader, FeatureWeight, HoldoutReport, IoError, REPORT_FILE, ReportWriter,
    TrainingReport, UNKNOWN,
};
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn fixture_cleans_to_complete_records() {
    let dataset = DatasetReader::new(&fixture_path("respiratory.csv"))
        .read()
        .expect("fixture should load");

    let summary = dataset.summary();
    assert_eq!(summary.rows_read, 11);
    assert_eq!(summary.rows_dropped, 1);
    assert_eq!(dataset.len(), 10);
    assert_eq!(summary.symptoms_filled, 2);
    assert_eq!(summary.sex_filled, 1);
    assert_eq!(summary.age_filled, 1);
    // Kept ages: 30 24 52 45 61 70 66 19 27 -> median 45.
    assert_eq!(summary.median_age, 45.0);

    for record in dataset.records() {
        assert!(!record.disease.is_empty());
        assert!(!record.symptoms.is_empty());
        assert!(!record.sex.is_empty());
        assert!(record.age.is_finite());
    }
    assert_eq!(dataset.records()[2].age, 45.0);
    assert_eq!(dataset.records()[5].symptoms, UNKNOWN);
    assert_eq!(dataset.records()[6].sex, UNKNOWN);
    assert_eq!(dataset.records()[2].symptoms, "shortness of breath, wheezing at night");
}

#[test]
fn report_round_trips_through_json() {
    let dataset = DatasetReader::new(&fixture_path("respiratory.csv"))
        .read()
        .unwrap();
    let dir = TempDir::new().unwrap();
    let writer = ReportWriter::new(dir.path()).unwrap();
    writer
        .write_training(&TrainingReport {
            run_id: "abc".to_string(),
            data_path: fixture_path("respiratory.csv").display().to_string(),
            cleaning: dataset.summary().clone(),
            n_classes: 4,
            n_features: 30,
            vocabulary_size: 28,
            n_trees: 100,
            seed: 42,
            top_features: vec![FeatureWeight {
                feature: "wheezing".to_string(),
                importance: 0.21,
            }],
            holdout: Some(HoldoutReport {
                n_train: 8,
                n_test: 2,
                accuracy: 1.0,
                classes: Vec::new(),
            }),
        })
        .unwrap();

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(REPORT_FILE)).unwrap()).unwrap();
    assert_eq!(content["cleaning"]["median_age"], 45.0);
    assert_eq!(content["holdout"]["n_test"], 2);
    assert_eq!(content["top_features"][0]["feature"], "wheezing");
    assert_eq!(content["top_features"][0]["importance"], 0.21);
}

#[test]
fn missing_file_is_reported_with_path() {
    let path = fixture_path("does_not_exist.csv");
    match DatasetReader::new(&path).read() {
        Err(IoError::FileNotFound { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected FileNotFound, got {other:?}"),
    }
}
