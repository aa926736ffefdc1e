//! CSV reader for the symptoms/age/sex training table.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::clean::{clean, is_missing};
use crate::domain::{CleanedDataset, RawRecord};
use crate::IoError;

/// Header names the reader requires; any other columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Disease", "Symptoms", "Age", "Sex"];

/// Reads the training table from a CSV file.
///
/// Expected CSV format:
/// - Header row required, containing at least `Disease,Symptoms,Age,Sex`
///   in any order (`Treatment`, `Nature` and others are skipped)
/// - Short rows are allowed; absent trailing cells count as missing
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::MissingColumn`] | A required column is absent from the header |
/// | [`IoError::InvalidAge`] | A present Age cell is not a finite number |
/// | [`IoError::EmptyDataset`] | No row has a Disease |
/// | [`IoError::NoAgeValues`] | No kept row has an Age |
pub struct DatasetReader {
    path: PathBuf,
}

impl DatasetReader {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read the file and clean it with [`clean`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<CleanedDataset, IoError> {
        let raw = self.read_raw()?;
        let dataset = clean(raw)?;
        info!(n_records = dataset.len(), "dataset loaded");
        Ok(dataset)
    }

    /// Read the file without filling or dropping anything.
    pub fn read_raw(&self) -> Result<Vec<RawRecord>, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.csv_error(e))?;
        let found: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
        let mut positions = [0usize; 4];
        for (slot, column) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = found
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| IoError::MissingColumn {
                    path: self.path.clone(),
                    column,
                    found: found.clone(),
                })?;
        }
        let [disease_at, symptoms_at, age_at, sex_at] = positions;
        debug!(n_columns = found.len(), "read CSV header");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.csv_error(e))?;
            let cell = |at: usize| record.get(at).filter(|c| !is_missing(c));

            let age = match cell(age_at) {
                None => None,
                Some(raw) => Some(parse_age(raw).ok_or_else(|| IoError::InvalidAge {
                    path: self.path.clone(),
                    row_index,
                    raw: raw.to_string(),
                })?),
            };

            records.push(RawRecord {
                disease: cell(disease_at).map(str::to_string),
                symptoms: cell(symptoms_at).map(str::to_string),
                age,
                sex: cell(sex_at).map(str::to_string),
            });
        }

        debug!(n_rows = records.len(), "read CSV rows");
        Ok(records)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

fn parse_age(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
