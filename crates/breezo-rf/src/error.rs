/// Errors from growing, evaluating or querying a forest.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    // --- settings ---
    #[error("a forest needs at least one tree, got {n_trees}")]
    InvalidTreeCount { n_trees: usize },

    #[error("max_depth must be positive, got {max_depth}")]
    InvalidMaxDepth { max_depth: usize },

    #[error("min_samples_split must be 2 or more, got {min_samples_split}")]
    InvalidMinSamplesSplit { min_samples_split: usize },

    #[error("min_samples_leaf must be positive, got {min_samples_leaf}")]
    InvalidMinSamplesLeaf { min_samples_leaf: usize },

    /// `max_features` resolved outside `1..=n_features`.
    #[error("cannot examine {max_features} of {n_features} features per split")]
    InvalidMaxFeatures {
        max_features: usize,
        n_features: usize,
    },

    /// Holdout fractions live in the open interval (0, 1).
    #[error("test fraction {fraction} is outside (0, 1)")]
    InvalidTestFraction { fraction: f64 },

    #[error("cannot hold out {fraction} of {n_samples} samples and keep both parts non-empty")]
    TooFewSamplesForHoldout { n_samples: usize, fraction: f64 },

    // --- training data ---
    #[error("no training samples")]
    EmptyDataset,

    #[error("training rows have no feature columns")]
    ZeroFeatures,

    #[error("at least one class is required")]
    ZeroClasses,

    #[error("row {sample_index} is {got} wide, expected {expected}")]
    FeatureCountMismatch {
        expected: usize,
        got: usize,
        sample_index: usize,
    },

    #[error("{n_labels} labels for {n_samples} rows")]
    LabelCountMismatch { n_samples: usize, n_labels: usize },

    #[error("row {sample_index} is labelled {label}, but there are only {n_classes} classes")]
    LabelOutOfRange {
        sample_index: usize,
        label: usize,
        n_classes: usize,
    },

    #[error("row {sample_index}, column {feature_index} is NaN or infinite")]
    NonFiniteValue {
        sample_index: usize,
        feature_index: usize,
    },

    // --- prediction ---
    #[error("sample is {got} wide, the model expects {expected}")]
    PredictionFeatureMismatch { expected: usize, got: usize },
}
