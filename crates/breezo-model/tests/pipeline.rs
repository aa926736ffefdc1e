use std::fs;

use breezo_io::{CleanedDataset, RawRecord, clean};
use breezo_model::{
    CLASSIFIER_FILE, DISEASE_ENCODER_FILE, DiagnosisModel, ModelError, Observation,
    TrainingConfig,
};
use tempfile::TempDir;

fn record(disease: &str, symptoms: &str, age: f64, sex: &str) -> RawRecord {
    RawRecord {
        disease: Some(disease.to_string()),
        symptoms: Some(symptoms.to_string()),
        age: Some(age),
        sex: Some(sex.to_string()),
    }
}

fn respiratory() -> CleanedDataset {
    let mut rows = Vec::new();
    for i in 0..8 {
        let age = 20.0 + i as f64;
        let sex = if i % 2 == 0 { "female" } else { "male" };
        rows.push(record("Asthma", "wheezing shortness of breath", age, sex));
        rows.push(record("Bronchitis", "cough mucus fatigue", age + 30.0, sex));
        rows.push(record("Pneumonia", "fever chills chest pain", age + 40.0, sex));
        rows.push(record("Common Cold", "sneezing runny nose", age + 5.0, sex));
        rows.push(record("Sinusitis", "facial pain congestion", age + 10.0, sex));
        rows.push(record("Influenza", "fever body aches", age + 15.0, sex));
    }
    // Missing symptoms and sex become "unknown"; a missing age takes the median.
    rows.push(RawRecord {
        disease: Some("Asthma".to_string()),
        symptoms: None,
        age: None,
        sex: None,
    });
    clean(rows).unwrap()
}

fn config() -> TrainingConfig {
    TrainingConfig::new().with_n_trees(25).with_seed(7)
}

#[test]
fn asthma_scenario_ranks_five_diseases() {
    let outcome = DiagnosisModel::train(&respiratory(), &config()).unwrap();
    let evaluation = outcome.evaluation.unwrap();
    assert_eq!(evaluation.per_disease.len(), 6);
    assert_eq!(evaluation.n_train + evaluation.n_test, 49);

    let ranked = outcome
        .model
        .predict(&Observation::new("wheezing, shortness of breath", 22.0, "female"), 5)
        .unwrap();

    assert!(ranked.len() <= 5);
    assert_eq!(ranked[0].disease, "Asthma");
    for pair in ranked.windows(2) {
        assert!(pair[0].probability >= pair[1].probability);
    }
    assert!(ranked.iter().all(|r| (0.0..=1.0).contains(&r.probability)));
    assert!(ranked.iter().map(|r| r.probability).sum::<f64>() <= 1.0 + 0.05);
    for r in &ranked {
        assert!(((r.probability * 100.0).round() / 100.0 - r.probability).abs() < 1e-12);
    }
}

#[test]
fn unknown_sex_category_from_training_is_accepted() {
    let model = DiagnosisModel::train(&respiratory(), &config()).unwrap().model;
    assert!(model.predict(&Observation::new("cough", 40.0, "unknown"), 5).is_ok());
}

#[test]
fn unseen_words_still_predict() {
    let model = DiagnosisModel::train(&respiratory(), &config()).unwrap().model;
    let ranked = model
        .predict(&Observation::new("xylophone zebra", 33.0, "male"), 5)
        .unwrap();
    assert_eq!(ranked.len(), 5);
}

#[test]
fn unseen_sex_is_an_error() {
    let model = DiagnosisModel::train(&respiratory(), &config()).unwrap().model;
    let err = model
        .predict(&Observation::new("cough", 40.0, "unspecified"), 5)
        .unwrap_err();
    assert!(err.to_string().contains("unspecified"));
}

#[test]
fn save_then_load_predicts_identically() {
    let dir = TempDir::new().unwrap();
    let model = DiagnosisModel::train(&respiratory(), &config()).unwrap().model;
    model.save(dir.path()).unwrap();

    let loaded = DiagnosisModel::load(dir.path()).unwrap();
    assert_eq!(loaded.run_id(), model.run_id());
    assert_eq!(loaded.diseases(), model.diseases());
    assert_eq!(loaded.encoder(), model.encoder());

    for obs in [
        Observation::new("wheezing", 25.0, "female"),
        Observation::new("fever chills", 70.0, "male"),
        Observation::new("", 10.0, "unknown"),
    ] {
        assert_eq!(
            loaded.predict_proba(&obs).unwrap(),
            model.predict_proba(&obs).unwrap()
        );
    }
}

#[test]
fn artifacts_from_different_runs_are_rejected() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    let no_holdout = config().with_test_fraction(None);
    DiagnosisModel::train(&respiratory(), &no_holdout)
        .unwrap()
        .model
        .save(first.path())
        .unwrap();
    DiagnosisModel::train(&respiratory(), &no_holdout)
        .unwrap()
        .model
        .save(second.path())
        .unwrap();

    fs::copy(
        second.path().join(DISEASE_ENCODER_FILE),
        first.path().join(DISEASE_ENCODER_FILE),
    )
    .unwrap();

    let err = DiagnosisModel::load(first.path()).unwrap_err();
    assert!(matches!(err, ModelError::RunIdMismatch { .. }));
    assert!(err.is_artifact_load());
}

#[test]
fn missing_classifier_fails_to_load() {
    let dir = TempDir::new().unwrap();
    let model = DiagnosisModel::train(&respiratory(), &config().with_test_fraction(None))
        .unwrap()
        .model;
    model.save(dir.path()).unwrap();
    fs::remove_file(dir.path().join(CLASSIFIER_FILE)).unwrap();

    let err = DiagnosisModel::load(dir.path()).unwrap_err();
    assert!(matches!(err, ModelError::ArtifactRead { .. }));
}

#[test]
fn empty_directory_fails_to_load() {
    let dir = TempDir::new().unwrap();
    assert!(DiagnosisModel::load(dir.path()).unwrap_err().is_artifact_load());
}
