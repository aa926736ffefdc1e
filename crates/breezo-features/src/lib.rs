//! Feature encoding for the breezo diagnosis pipeline.
//!
//! Turns `(symptoms, age, sex)` observations into fixed-width numeric rows
//! `[tfidf | age | sex]`, maps disease names to class indices, and ranks a
//! class probability vector back into named diagnoses.

mod codec;
mod encoder;
mod error;
mod rank;
mod tfidf;

pub use codec::{CategoricalCodecs, LabelCodec};
pub use encoder::{AGE_FEATURE, FeatureEncoder, Observation, SEX_COLUMN};
pub use error::FeatureError;
pub use rank::{DEFAULT_TOP_K, RankedDiagnosis, rank_diseases, top_k};
pub use tfidf::{DEFAULT_MAX_VOCABULARY, TfidfVectorizer, tokenize};
