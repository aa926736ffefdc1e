//! Versioned bincode artifact files.
//!
//! Each file is a bincode [`ArtifactHeader`] immediately followed by the
//! bincode payload. Writes go through a temporary file in the target
//! directory that is renamed into place.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ModelError;

/// Layout version written into every artifact header.
pub const FORMAT_VERSION: u32 = 1;

pub const CLASSIFIER_FILE: &str = "classifier.bin";
pub const TFIDF_FILE: &str = "tfidf_vectorizer.bin";
pub const LABEL_ENCODERS_FILE: &str = "label_encoders.bin";
pub const DISEASE_ENCODER_FILE: &str = "disease_encoder.bin";

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactHeader {
    kind: String,
    format_version: u32,
    run_id: String,
}

/// Write `payload` to `dir/file_name` under `run_id`.
pub(crate) fn write_artifact<T: Serialize>(
    dir: &Path,
    file_name: &'static str,
    run_id: &str,
    payload: &T,
) -> Result<PathBuf, ModelError> {
    let path = dir.join(file_name);
    let write_err = |source: std::io::Error| ModelError::ArtifactWrite {
        path: path.clone(),
        source,
    };
    let encode_err = |source: bincode::Error| ModelError::ArtifactEncode {
        path: path.clone(),
        source,
    };

    let temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(&temp);
        let header = ArtifactHeader {
            kind: file_name.to_string(),
            format_version: FORMAT_VERSION,
            run_id: run_id.to_string(),
        };
        bincode::serialize_into(&mut writer, &header).map_err(encode_err)?;
        bincode::serialize_into(&mut writer, payload).map_err(encode_err)?;
        writer.flush().map_err(write_err)?;
    }
    temp.persist(&path).map_err(|e| write_err(e.error))?;

    debug!(path = %path.display(), "artifact written");
    Ok(path)
}

/// Read `dir/file_name`, returning its run id and payload.
///
/// The header is checked before the payload is decoded.
pub(crate) fn read_artifact<T: DeserializeOwned>(
    dir: &Path,
    file_name: &'static str,
) -> Result<(String, T), ModelError> {
    let path = dir.join(file_name);
    let file = File::open(&path).map_err(|source| ModelError::ArtifactRead {
        path: path.clone(),
        source,
    })?;
    let mut reader = BufReader::new(file);
    let decode_err = |source: bincode::Error| ModelError::ArtifactDecode {
        path: path.clone(),
        source,
    };

    let header: ArtifactHeader = bincode::deserialize_from(&mut reader).map_err(decode_err)?;
    if header.kind != file_name || header.format_version != FORMAT_VERSION {
        return Err(ModelError::IncompatibleArtifact {
            path: path.clone(),
            kind: header.kind,
            format_version: header.format_version,
            expected_kind: file_name,
            expected_version: FORMAT_VERSION,
        });
    }
    let payload: T = bincode::deserialize_from(&mut reader).map_err(decode_err)?;

    debug!(path = %path.display(), run_id = %header.run_id, "artifact read");
    Ok((header.run_id, payload))
}
