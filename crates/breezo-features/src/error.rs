/// Errors from fitting or applying feature encoders.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// Returned when a categorical value was not seen while fitting.
    #[error("unknown {column} value \"{value}\"; known values: {known:?}")]
    UnknownCategory {
        /// Name of the categorical column.
        column: String,
        /// The unseen value.
        value: String,
        /// Values the codec was fitted on.
        known: Vec<String>,
    },

    /// Returned when decoding an index outside the fitted class range.
    #[error("class index {index} out of range for {n_classes} classes")]
    UnknownClassIndex {
        /// The offending index.
        index: usize,
        /// Number of fitted classes.
        n_classes: usize,
    },

    /// Returned when a codec is fitted on zero values.
    #[error("cannot fit {column} codec on zero values")]
    EmptyCategories {
        /// Name of the categorical column.
        column: String,
    },

    /// Returned when an age is NaN or infinite.
    #[error("age must be a finite number, got {age}")]
    NonFiniteAge {
        /// The rejected age.
        age: f64,
    },

    /// Returned when the vocabulary cap is zero.
    #[error("max_vocabulary must be at least 1")]
    InvalidMaxVocabulary,

    /// Returned when no document yields a single token.
    #[error("empty vocabulary: {n_documents} documents contain no tokens of two or more word characters")]
    EmptyVocabulary {
        /// Number of documents in the corpus.
        n_documents: usize,
    },

    /// Returned when the categorical codec map lacks a required column.
    #[error("no codec fitted for column \"{column}\"")]
    MissingCodec {
        /// The missing column name.
        column: String,
    },
}
