//! Label codecs: sorted bijections between category strings and indices.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// A bijection between the distinct values of one column and `0..len()`.
///
/// Indices follow the sorted order of the values, not the order in which
/// they were first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCodec {
    column: String,
    classes: Vec<String>,
}

impl LabelCodec {
    /// Fit a codec on every value of `column`.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::EmptyCategories`] when `values` is empty.
    pub fn fit<I, S>(column: &str, values: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        if distinct.is_empty() {
            return Err(FeatureError::EmptyCategories {
                column: column.to_string(),
            });
        }
        Ok(Self {
            column: column.to_string(),
            classes: distinct.into_iter().collect(),
        })
    }

    /// # Errors
    ///
    /// Returns [`FeatureError::UnknownCategory`] when `value` was not fitted.
    pub fn encode(&self, value: &str) -> Result<usize, FeatureError> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .map_err(|_| FeatureError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
                known: self.classes.clone(),
            })
    }

    /// # Errors
    ///
    /// Returns [`FeatureError::UnknownClassIndex`] when `index >= len()`.
    pub fn decode(&self, index: usize) -> Result<&str, FeatureError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or(FeatureError::UnknownClassIndex {
                index,
                n_classes: self.classes.len(),
            })
    }

    /// Fitted values in index order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Codecs for the categorical input columns, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoricalCodecs {
    codecs: BTreeMap<String, LabelCodec>,
}

impl CategoricalCodecs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `codec` under its column name, replacing any previous one.
    pub fn insert(&mut self, codec: LabelCodec) {
        self.codecs.insert(codec.column.clone(), codec);
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<&LabelCodec> {
        self.codecs.get(column)
    }

    /// Encode `value` with the codec registered for `column`.
    ///
    /// # Errors
    ///
    /// [`FeatureError::MissingCodec`] when no codec is registered for
    /// `column`, otherwise whatever [`LabelCodec::encode`] returns.
    pub fn encode(&self, column: &str, value: &str) -> Result<usize, FeatureError> {
        self.get(column)
            .ok_or_else(|| FeatureError::MissingCodec {
                column: column.to_string(),
            })?
            .encode(value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }
}
