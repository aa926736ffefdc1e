//! TF-IDF text vectorizer with a frequency-capped vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::FeatureError;

/// Vocabulary cap used when training the diagnosis model.
pub const DEFAULT_MAX_VOCABULARY: usize = 300;

/// Split text into lowercase tokens.
///
/// A token is a maximal run of alphanumeric characters or `_` that is at
/// least two characters long. Everything else separates tokens.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_lowercase)
}

/// A fitted TF-IDF transform over a frozen vocabulary.
///
/// Columns are laid out in lexicographic term order. A document's vector is
/// its raw term counts scaled by `idf = ln((1 + n) / (1 + df)) + 1`, then
/// L2-normalized. Terms outside the vocabulary contribute nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: Vec<String>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learn the vocabulary and idf weights from a corpus.
    ///
    /// Keeps the `max_vocabulary` terms with the highest total count across
    /// the corpus; equal counts are resolved in favour of the
    /// lexicographically smaller term.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FeatureError::InvalidMaxVocabulary`] | `max_vocabulary` is zero |
    /// | [`FeatureError::EmptyVocabulary`] | no document contains a token |
    #[instrument(skip(documents), fields(n_documents = documents.len()))]
    pub fn fit<S: AsRef<str>>(documents: &[S], max_vocabulary: usize) -> Result<Self, FeatureError> {
        if max_vocabulary == 0 {
            return Err(FeatureError::InvalidMaxVocabulary);
        }

        // term -> (corpus count, document frequency)
        let mut stats: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for doc in documents {
            let mut seen: BTreeMap<String, usize> = BTreeMap::new();
            for token in tokenize(doc.as_ref()) {
                *seen.entry(token).or_default() += 1;
            }
            for (term, count) in seen {
                let entry = stats.entry(term).or_default();
                entry.0 += count;
                entry.1 += 1;
            }
        }
        if stats.is_empty() {
            return Err(FeatureError::EmptyVocabulary {
                n_documents: documents.len(),
            });
        }
        let n_candidates = stats.len();

        // `stats` iterates in term order, so a stable sort on count keeps
        // ties alphabetical.
        let mut ranked: Vec<(String, (usize, usize))> = stats.into_iter().collect();
        ranked.sort_by(|a, b| b.1.0.cmp(&a.1.0));
        ranked.truncate(max_vocabulary);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = documents.len() as f64;
        let (vocabulary, idf): (Vec<String>, Vec<f64>) = ranked
            .into_iter()
            .map(|(term, (_, df))| {
                let weight = ((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0;
                (term, weight)
            })
            .unzip();

        debug!(
            n_candidates,
            n_terms = vocabulary.len(),
            "tfidf vocabulary fitted"
        );

        Ok(Self { vocabulary, idf })
    }

    /// Fit on `documents` and return the vectorizer with every document's row.
    ///
    /// # Errors
    ///
    /// Same as [`TfidfVectorizer::fit`].
    pub fn fit_transform<S: AsRef<str>>(
        documents: &[S],
        max_vocabulary: usize,
    ) -> Result<(Self, Vec<Vec<f64>>), FeatureError> {
        let vectorizer = Self::fit(documents, max_vocabulary)?;
        let rows = documents
            .iter()
            .map(|doc| vectorizer.transform(doc.as_ref()))
            .collect();
        Ok((vectorizer, rows))
    }

    /// Weight `document` against the frozen vocabulary.
    ///
    /// Always returns `self.len()` values. A document without any known term
    /// maps to the zero vector.
    #[must_use]
    pub fn transform(&self, document: &str) -> Vec<f64> {
        let mut row = vec![0.0; self.vocabulary.len()];
        for token in tokenize(document) {
            if let Ok(column) = self.vocabulary.binary_search(&token) {
                row[column] += 1.0;
            }
        }
        for (value, idf) in row.iter_mut().zip(&self.idf) {
            *value *= idf;
        }
        let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|v| *v /= norm);
        }
        row
    }

    /// Vocabulary terms in column order.
    #[must_use]
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    #[must_use]
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }

    /// Whether the idf table matches the vocabulary and the terms are in
    /// strictly increasing order. Deserialized vectorizers should pass this
    /// before use.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.vocabulary.len() == self.idf.len()
            && self.vocabulary.windows(2).all(|w| w[0] < w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        tokenize(text).collect()
    }

    #[test]
    fn tokenizer_rules() {
        assert_eq!(tokens("Cough, WHEEZING & fever!"), ["cough", "wheezing", "fever"]);
        assert_eq!(tokens("a b cd"), ["cd"]);
        assert_eq!(tokens("short_breath 2x x2 3"), ["short_breath", "2x", "x2"]);
        assert!(tokens("").is_empty());
        assert_eq!(tokens("fièvre très"), ["fièvre", "très"]);
    }

    #[test]
    fn idf_follows_smoothed_formula() {
        let v = TfidfVectorizer::fit(&["cough fever", "cough"], 10).unwrap();
        assert_eq!(v.vocabulary(), ["cough", "fever"]);
        assert!((v.idf()[0] - 1.0).abs() < 1e-12);
        assert!((v.idf()[1] - (1.5_f64.ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn transform_is_l2_normalized_count_times_idf() {
        let v = TfidfVectorizer::fit(&["cough fever", "cough"], 10).unwrap();
        let row = v.transform("cough cough fever");
        let raw = [2.0, 1.5_f64.ln() + 1.0];
        let norm = (raw[0] * raw[0] + raw[1] * raw[1]).sqrt();
        assert!((row[0] - raw[0] / norm).abs() < 1e-12);
        assert!((row[1] - raw[1] / norm).abs() < 1e-12);
        let length: f64 = row.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((length - 1.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_vocabulary_text_is_zero() {
        let v = TfidfVectorizer::fit(&["cough fever"], 10).unwrap();
        assert_eq!(v.transform("rash itching"), vec![0.0, 0.0]);
        assert_eq!(v.transform(""), vec![0.0, 0.0]);
    }

    #[test]
    fn cap_keeps_most_frequent_with_alphabetical_ties() {
        let docs = ["zeta zeta alpha beta", "zeta gamma beta", "delta"];
        // counts: zeta 3, beta 2, alpha 1, delta 1, gamma 1
        let v = TfidfVectorizer::fit(&docs, 3).unwrap();
        assert_eq!(v.vocabulary(), ["alpha", "beta", "zeta"]);
        assert_eq!(v.len(), 3);
        assert!(v.is_well_formed());
    }

    #[test]
    fn fit_transform_rows_match_transform() {
        let docs = ["cough wheezing", "cough chest pain", "itchy rash"];
        let (v, rows) = TfidfVectorizer::fit_transform(&docs, 300).unwrap();
        assert_eq!(rows.len(), 3);
        for (doc, row) in docs.iter().zip(&rows) {
            assert_eq!(row.len(), v.len());
            assert_eq!(&v.transform(doc), row);
        }
    }

    #[test]
    fn fit_errors() {
        assert!(matches!(
            TfidfVectorizer::fit(&["cough"], 0),
            Err(FeatureError::InvalidMaxVocabulary)
        ));
        assert!(matches!(
            TfidfVectorizer::fit(&["a", "!"], 10),
            Err(FeatureError::EmptyVocabulary { n_documents: 2 })
        ));
    }
}
