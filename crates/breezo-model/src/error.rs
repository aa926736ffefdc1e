use std::path::PathBuf;

use breezo_features::FeatureError;
use breezo_rf::RfError;

/// Errors from training, persisting, loading or querying the model bundle.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Feature encoding failed (unknown category, non-finite age, ...).
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Forest training or prediction failed.
    #[error(transparent)]
    Forest(#[from] RfError),

    /// Returned when the artifact directory cannot be created.
    #[error("failed to create artifact directory {path}")]
    CreateDir {
        /// Directory path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an artifact cannot be written or moved into place.
    #[error("failed to write artifact {path}")]
    ArtifactWrite {
        /// Final artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an artifact cannot be encoded.
    #[error("failed to encode artifact {path}")]
    ArtifactEncode {
        /// Final artifact path.
        path: PathBuf,
        /// Underlying bincode error.
        source: bincode::Error,
    },

    /// Returned when an artifact file is missing or unreadable.
    #[error("failed to open artifact {path}")]
    ArtifactRead {
        /// Artifact path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when an artifact's bytes do not decode.
    #[error("failed to decode artifact {path}")]
    ArtifactDecode {
        /// Artifact path.
        path: PathBuf,
        /// Underlying bincode error.
        source: bincode::Error,
    },

    /// Returned when an artifact was written by an incompatible format version
    /// or holds a different kind of artifact than its file name promises.
    #[error("artifact {path} has kind \"{kind}\" format {format_version}, expected \"{expected_kind}\" format {expected_version}")]
    IncompatibleArtifact {
        /// Artifact path.
        path: PathBuf,
        /// Kind recorded in the file.
        kind: String,
        /// Format version recorded in the file.
        format_version: u32,
        /// Kind expected for this file.
        expected_kind: &'static str,
        /// Format version this build reads.
        expected_version: u32,
    },

    /// Returned when the artifacts in one directory come from different runs.
    #[error("artifact {path} belongs to run {found}, expected run {expected}")]
    RunIdMismatch {
        /// Artifact path.
        path: PathBuf,
        /// Run id of the classifier artifact.
        expected: String,
        /// Run id found in this artifact.
        found: String,
    },

    /// Returned when loaded artifacts disagree on a dimension.
    #[error("artifact shape mismatch: {what} is {found}, expected {expected}")]
    ShapeMismatch {
        /// The dimension being compared.
        what: &'static str,
        /// Value implied by the other artifacts.
        expected: usize,
        /// Value found.
        found: usize,
    },

    /// Returned when a decoded artifact violates its own invariants.
    #[error("malformed artifact {path}: {reason}")]
    MalformedArtifact {
        /// Artifact path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },
}

impl ModelError {
    /// Whether this error means the artifact set is missing, corrupt or
    /// inconsistent, which makes the model unusable.
    #[must_use]
    pub fn is_artifact_load(&self) -> bool {
        matches!(
            self,
            ModelError::ArtifactRead { .. }
                | ModelError::ArtifactDecode { .. }
                | ModelError::IncompatibleArtifact { .. }
                | ModelError::RunIdMismatch { .. }
                | ModelError::ShapeMismatch { .. }
                | ModelError::MalformedArtifact { .. }
        )
    }
}
