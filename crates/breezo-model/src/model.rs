//! Training, persistence and prediction for the full diagnosis pipeline.

use std::fs;
use std::path::Path;

use breezo_features::{
    CategoricalCodecs, FeatureEncoder, LabelCodec, Observation, RankedDiagnosis,
    TfidfVectorizer, rank_diseases,
};
use breezo_io::CleanedDataset;
use breezo_rf::{HoldoutSplit, RandomForest};
use rand::Rng;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::artifacts::{
    CLASSIFIER_FILE, DISEASE_ENCODER_FILE, LABEL_ENCODERS_FILE, TFIDF_FILE, read_artifact,
    write_artifact,
};
use crate::config::TrainingConfig;
use crate::error::ModelError;

/// Column name of the disease codec.
const DISEASE_COLUMN: &str = "Disease";

/// Everything one training run produced: encoder, disease codec and forest.
///
/// Immutable once built; share it behind an `Arc` for concurrent readers.
#[derive(Debug, Clone)]
pub struct DiagnosisModel {
    run_id: String,
    encoder: FeatureEncoder,
    diseases: LabelCodec,
    forest: RandomForest,
}

/// Holdout scores for one training run.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub n_train: usize,
    pub n_test: usize,
    pub per_disease: Vec<DiseaseMetrics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiseaseMetrics {
    pub disease: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Result of [`DiagnosisModel::train`].
#[derive(Debug)]
pub struct TrainingOutcome {
    pub model: DiagnosisModel,
    /// `None` when the config disabled the holdout split.
    pub evaluation: Option<Evaluation>,
}

impl DiagnosisModel {
    /// Fit the encoder and disease codec on `dataset`, optionally score a
    /// holdout split, then fit the final forest on every row.
    ///
    /// # Errors
    ///
    /// [`ModelError::Feature`] when the encoder cannot be fitted and
    /// [`ModelError::Forest`] for invalid forest settings or a dataset too
    /// small for the requested holdout split.
    #[instrument(skip_all, fields(n_records = dataset.len(), n_trees = config.n_trees()))]
    pub fn train(
        dataset: &CleanedDataset,
        config: &TrainingConfig,
    ) -> Result<TrainingOutcome, ModelError> {
        let records = dataset.records();
        let observations: Vec<Observation> = records
            .iter()
            .map(|r| Observation::new(r.symptoms.clone(), r.age, r.sex.clone()))
            .collect();

        let diseases = LabelCodec::fit(DISEASE_COLUMN, records.iter().map(|r| r.disease.as_str()))?;
        let labels = records
            .iter()
            .map(|r| diseases.encode(&r.disease))
            .collect::<Result<Vec<_>, _>>()?;

        let (encoder, matrix) = FeatureEncoder::fit(&observations, config.max_vocabulary())?;
        let feature_names = encoder.feature_names();
        let forest_config = config.forest_config()?;

        info!(
            n_classes = diseases.len(),
            n_features = encoder.width(),
            vocabulary = encoder.tfidf().len(),
            "features encoded"
        );

        let evaluation = match config.test_fraction() {
            Some(fraction) => {
                let holdout = HoldoutSplit::new(fraction)?
                    .with_seed(config.seed())
                    .evaluate(&forest_config, &matrix, &labels, diseases.len(), &feature_names)?;
                let per_disease = holdout
                    .confusion_matrix
                    .class_metrics()
                    .into_iter()
                    .map(|m| {
                        Ok(DiseaseMetrics {
                            disease: diseases.decode(m.class)?.to_string(),
                            precision: m.precision,
                            recall: m.recall,
                            f1: m.f1,
                            support: m.support,
                        })
                    })
                    .collect::<Result<Vec<_>, ModelError>>()?;
                Some(Evaluation {
                    accuracy: holdout.accuracy,
                    n_train: holdout.n_train,
                    n_test: holdout.n_test,
                    per_disease,
                })
            }
            None => None,
        };

        let forest = forest_config.fit(&matrix, &labels, diseases.len(), &feature_names)?;
        let run_id = format!("{:016x}", rand::thread_rng().r#gen::<u64>());
        info!(%run_id, "diagnosis model trained");

        Ok(TrainingOutcome {
            model: Self {
                run_id,
                encoder,
                diseases,
                forest,
            },
            evaluation,
        })
    }

    /// Class probabilities for one observation, indexed like [`Self::diseases`].
    ///
    /// # Errors
    ///
    /// [`ModelError::Feature`] for an unseen sex or non-finite age.
    pub fn predict_proba(&self, observation: &Observation) -> Result<Vec<f64>, ModelError> {
        let row = self.encoder.transform(observation)?;
        Ok(self.forest.predict_proba(&row)?.into_vec())
    }

    /// The `k` most likely diseases, highest probability first, each rounded
    /// to two decimals.
    ///
    /// # Errors
    ///
    /// Same as [`DiagnosisModel::predict_proba`].
    pub fn predict(
        &self,
        observation: &Observation,
        k: usize,
    ) -> Result<Vec<RankedDiagnosis>, ModelError> {
        let probabilities = self.predict_proba(observation)?;
        Ok(rank_diseases(&probabilities, &self.diseases, k)?)
    }

    /// Write the four artifact files into `dir`, creating it if needed.
    ///
    /// Every file is replaced atomically and stamped with this model's run id.
    ///
    /// # Errors
    ///
    /// [`ModelError::CreateDir`], [`ModelError::ArtifactEncode`] or
    /// [`ModelError::ArtifactWrite`].
    #[instrument(skip_all, fields(run_id = %self.run_id, dir = %dir.display()))]
    pub fn save(&self, dir: &Path) -> Result<(), ModelError> {
        fs::create_dir_all(dir).map_err(|source| ModelError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
        write_artifact(dir, TFIDF_FILE, &self.run_id, self.encoder.tfidf())?;
        write_artifact(dir, LABEL_ENCODERS_FILE, &self.run_id, self.encoder.categoricals())?;
        write_artifact(dir, DISEASE_ENCODER_FILE, &self.run_id, &self.diseases)?;
        // Classifier last: a directory with a fresh classifier has a complete set.
        write_artifact(dir, CLASSIFIER_FILE, &self.run_id, &self.forest)?;
        info!(dir = %dir.display(), "artifacts saved");
        Ok(())
    }

    /// Load and cross-check the four artifact files in `dir`.
    ///
    /// # Errors
    ///
    /// Any failure is artifact-load class (see [`ModelError::is_artifact_load`]):
    /// a missing or undecodable file, a foreign format version, artifacts from
    /// different runs, or dimensions that do not line up.
    #[instrument(skip_all, fields(dir = %dir.display()))]
    pub fn load(dir: &Path) -> Result<Self, ModelError> {
        let (run_id, forest): (String, RandomForest) = read_artifact(dir, CLASSIFIER_FILE)?;
        let tfidf: TfidfVectorizer = read_matching(dir, TFIDF_FILE, &run_id)?;
        let categoricals: CategoricalCodecs = read_matching(dir, LABEL_ENCODERS_FILE, &run_id)?;
        let diseases: LabelCodec = read_matching(dir, DISEASE_ENCODER_FILE, &run_id)?;

        if !tfidf.is_well_formed() {
            return Err(ModelError::MalformedArtifact {
                path: dir.join(TFIDF_FILE),
                reason: "vocabulary and idf tables disagree or are unsorted".to_string(),
            });
        }
        let encoder = FeatureEncoder::from_parts(tfidf, categoricals).map_err(|e| {
            ModelError::MalformedArtifact {
                path: dir.join(LABEL_ENCODERS_FILE),
                reason: e.to_string(),
            }
        })?;

        check_shape("classifier feature count", encoder.width(), forest.n_features())?;
        check_shape("classifier class count", diseases.len(), forest.n_classes())?;

        info!(
            %run_id,
            n_classes = diseases.len(),
            n_features = encoder.width(),
            n_trees = forest.n_trees(),
            "artifacts loaded"
        );

        Ok(Self {
            run_id,
            encoder,
            diseases,
            forest,
        })
    }

    /// Identifier shared by every artifact of the run that built this model.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    #[must_use]
    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    #[must_use]
    pub fn diseases(&self) -> &LabelCodec {
        &self.diseases
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.diseases.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.encoder.width()
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.forest.n_trees()
    }

    /// The `n` most informative columns by mean impurity decrease, highest
    /// first. Ties keep column order.
    #[must_use]
    pub fn top_features(&self, n: usize) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .forest
            .feature_names()
            .iter()
            .cloned()
            .zip(self.forest.feature_importances())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

fn read_matching<T: serde::de::DeserializeOwned>(
    dir: &Path,
    file_name: &'static str,
    expected_run: &str,
) -> Result<T, ModelError> {
    let (run_id, payload) = read_artifact(dir, file_name)?;
    if run_id != expected_run {
        warn!(file = file_name, %run_id, expected = expected_run, "artifact from another run");
        return Err(ModelError::RunIdMismatch {
            path: dir.join(file_name),
            expected: expected_run.to_string(),
            found: run_id,
        });
    }
    Ok(payload)
}

fn check_shape(what: &'static str, expected: usize, found: usize) -> Result<(), ModelError> {
    if expected != found {
        return Err(ModelError::ShapeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use breezo_io::{RawRecord, clean};
    use tempfile::TempDir;

    fn dataset() -> CleanedDataset {
        let rows = [
            ("Asthma", "wheezing shortness of breath", 30.0, "female"),
            ("Asthma", "wheezing chest tightness", 25.0, "male"),
            ("Asthma", "wheezing night cough", 35.0, "female"),
            ("Bronchitis", "cough mucus fatigue", 50.0, "male"),
            ("Bronchitis", "cough mucus fever", 55.0, "female"),
            ("Bronchitis", "persistent cough mucus", 60.0, "male"),
        ];
        let raw = rows
            .iter()
            .map(|&(d, s, a, x)| RawRecord {
                disease: Some(d.to_string()),
                symptoms: Some(s.to_string()),
                age: Some(a),
                sex: Some(x.to_string()),
            })
            .collect();
        clean(raw).unwrap()
    }

    fn small_config() -> TrainingConfig {
        TrainingConfig::new().with_n_trees(15).with_test_fraction(None)
    }

    #[test]
    fn train_without_holdout_has_no_evaluation() {
        let outcome = DiagnosisModel::train(&dataset(), &small_config()).unwrap();
        assert!(outcome.evaluation.is_none());
        let model = outcome.model;
        assert_eq!(model.n_classes(), 2);
        assert_eq!(model.n_trees(), 15);
        assert_eq!(model.n_features(), model.encoder().tfidf().len() + 2);
        assert_eq!(model.run_id().len(), 16);
    }

    #[test]
    fn holdout_reports_every_disease() {
        let config = small_config().with_test_fraction(Some(0.34));
        let evaluation = DiagnosisModel::train(&dataset(), &config)
            .unwrap()
            .evaluation
            .unwrap();
        assert_eq!(evaluation.n_train + evaluation.n_test, 6);
        assert_eq!(evaluation.per_disease.len(), 2);
        assert_eq!(evaluation.per_disease[0].disease, "Asthma");
        assert!((0.0..=1.0).contains(&evaluation.accuracy));
    }

    #[test]
    fn probabilities_cover_every_disease() {
        let model = DiagnosisModel::train(&dataset(), &small_config()).unwrap().model;
        let proba = model
            .predict_proba(&Observation::new("wheezing", 28.0, "female"))
            .unwrap();
        assert_eq!(proba.len(), 2);
        assert!((proba.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn top_features_are_ranked() {
        let model = DiagnosisModel::train(&dataset(), &small_config()).unwrap().model;
        let top = model.top_features(3);
        assert_eq!(top.len(), 3);
        assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));
        let names = model.encoder().feature_names();
        assert!(top.iter().all(|(name, _)| names.contains(name)));
        assert_eq!(model.top_features(1000).len(), model.n_features());
    }

    #[test]
    fn unseen_sex_is_rejected() {
        let model = DiagnosisModel::train(&dataset(), &small_config()).unwrap().model;
        let err = model
            .predict(&Observation::new("cough", 40.0, "unspecified"), 5)
            .unwrap_err();
        assert!(matches!(err, ModelError::Feature(_)));
        assert!(!err.is_artifact_load());
    }

    #[test]
    fn save_creates_directory_and_four_files() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("models");
        let model = DiagnosisModel::train(&dataset(), &small_config()).unwrap().model;
        model.save(&target).unwrap();
        for file in [CLASSIFIER_FILE, TFIDF_FILE, LABEL_ENCODERS_FILE, DISEASE_ENCODER_FILE] {
            assert!(target.join(file).is_file(), "{file} missing");
        }
    }

    #[test]
    fn shape_check() {
        assert!(check_shape("x", 3, 3).is_ok());
        let err = check_shape("x", 3, 4).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { expected: 3, found: 4, .. }));
    }
}
