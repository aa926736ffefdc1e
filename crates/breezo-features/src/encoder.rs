//! The shared encoding contract: `(symptoms, age, sex)` to `[tfidf | age | sex]`.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::codec::{CategoricalCodecs, LabelCodec};
use crate::error::FeatureError;
use crate::tfidf::TfidfVectorizer;

/// Column name of the sex codec inside [`CategoricalCodecs`].
pub const SEX_COLUMN: &str = "Sex";

/// Feature name of the pass-through age column.
pub const AGE_FEATURE: &str = "Age";

/// One patient description, as seen at training or inference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub symptoms: String,
    pub age: f64,
    pub sex: String,
}

impl Observation {
    pub fn new(symptoms: impl Into<String>, age: f64, sex: impl Into<String>) -> Self {
        Self {
            symptoms: symptoms.into(),
            age,
            sex: sex.into(),
        }
    }
}

/// Frozen text and categorical transforms producing fixed-width rows.
///
/// Every row is laid out as the TF-IDF weights over the vocabulary, then the
/// raw age, then the sex code, so [`FeatureEncoder::width`] is always the
/// vocabulary size plus two.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    tfidf: TfidfVectorizer,
    categoricals: CategoricalCodecs,
}

impl FeatureEncoder {
    /// Fit the vectorizer and the sex codec, then encode every observation
    /// through [`FeatureEncoder::transform`].
    ///
    /// # Errors
    ///
    /// Propagates [`TfidfVectorizer::fit`] and [`LabelCodec::fit`] errors, and
    /// [`FeatureError::NonFiniteAge`] for any non-finite age.
    #[instrument(skip(observations), fields(n_observations = observations.len()))]
    pub fn fit(
        observations: &[Observation],
        max_vocabulary: usize,
    ) -> Result<(Self, Vec<Vec<f64>>), FeatureError> {
        let symptoms: Vec<&str> = observations.iter().map(|o| o.symptoms.as_str()).collect();
        let tfidf = TfidfVectorizer::fit(&symptoms, max_vocabulary)?;

        let mut categoricals = CategoricalCodecs::new();
        categoricals.insert(LabelCodec::fit(
            SEX_COLUMN,
            observations.iter().map(|o| o.sex.as_str()),
        )?);

        let encoder = Self { tfidf, categoricals };
        let matrix = observations
            .iter()
            .map(|o| encoder.transform(o))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(width = encoder.width(), "feature encoder fitted");
        Ok((encoder, matrix))
    }

    /// Reassemble an encoder from separately persisted parts.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::MissingCodec`] when `categoricals` has no
    /// [`SEX_COLUMN`] codec.
    pub fn from_parts(
        tfidf: TfidfVectorizer,
        categoricals: CategoricalCodecs,
    ) -> Result<Self, FeatureError> {
        if categoricals.get(SEX_COLUMN).is_none() {
            return Err(FeatureError::MissingCodec {
                column: SEX_COLUMN.to_string(),
            });
        }
        Ok(Self { tfidf, categoricals })
    }

    /// Encode one observation against the frozen transforms.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::UnknownCategory`] | `sex` was not seen while fitting |
    /// | [`FeatureError::NonFiniteAge`] | `age` is NaN or infinite |
    pub fn transform(&self, observation: &Observation) -> Result<Vec<f64>, FeatureError> {
        if !observation.age.is_finite() {
            return Err(FeatureError::NonFiniteAge {
                age: observation.age,
            });
        }
        let sex = self.categoricals.encode(SEX_COLUMN, &observation.sex)?;

        let mut row = self.tfidf.transform(&observation.symptoms);
        row.reserve_exact(2);
        row.push(observation.age);
        row.push(sex as f64);
        Ok(row)
    }

    /// Number of columns in every encoded row.
    #[must_use]
    pub fn width(&self) -> usize {
        self.tfidf.len() + 2
    }

    /// Column names in row order: vocabulary terms, `Age`, `Sex`.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.tfidf.vocabulary().to_vec();
        names.push(AGE_FEATURE.to_string());
        names.push(SEX_COLUMN.to_string());
        names
    }

    #[must_use]
    pub fn tfidf(&self) -> &TfidfVectorizer {
        &self.tfidf
    }

    #[must_use]
    pub fn categoricals(&self) -> &CategoricalCodecs {
        &self.categoricals
    }
}
