//! The diagnosis model bundle.
//!
//! [`DiagnosisModel`] owns the fitted feature encoder, disease codec and
//! random forest produced by one training run, persists them as a matched
//! artifact set, and answers ranked top-K predictions.

mod artifacts;
mod config;
mod error;
mod model;

pub use artifacts::{
    CLASSIFIER_FILE, DISEASE_ENCODER_FILE, FORMAT_VERSION, LABEL_ENCODERS_FILE, TFIDF_FILE,
};
pub use config::TrainingConfig;
pub use error::ModelError;
pub use model::{DiagnosisModel, DiseaseMetrics, Evaluation, TrainingOutcome};

pub use breezo_features::{Observation, RankedDiagnosis};
