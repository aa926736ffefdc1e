use std::path::PathBuf;

/// Errors from reading and cleaning the training table, and from writing
/// run reports.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The training file could not be opened.
    #[error("cannot open {path}")]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A record is not valid CSV.
    #[error("malformed CSV in {path} near byte {offset}")]
    CsvParse {
        path: PathBuf,
        offset: u64,
        source: csv::Error,
    },

    #[error("{path} has no \"{column}\" column (header: {found:?})")]
    MissingColumn {
        path: PathBuf,
        column: &'static str,
        found: Vec<String>,
    },

    /// An Age cell holds something other than a finite number.
    /// `row_index` counts data rows from zero.
    #[error("{path}: age \"{raw}\" on data row {row_index} is not a number")]
    InvalidAge {
        path: PathBuf,
        row_index: usize,
        raw: String,
    },

    /// Every row lacks a Disease.
    #[error("no labelled rows: every row lacks a Disease")]
    EmptyDataset,

    /// Every labelled row lacks an Age, so no median exists to fill with.
    #[error("cannot fill missing ages: no row has an Age value")]
    NoAgeValues,

    #[error("cannot create report directory {path}")]
    OutputDirCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot encode report as JSON")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}
