//! Dataset loading, cleaning and report output for the breezo pipeline.

mod clean;
mod domain;
mod error;
mod reader;
mod writer;

pub use clean::{clean, is_missing, median};
pub use domain::{CleanedDataset, CleaningSummary, RawRecord, TrainingRecord, UNKNOWN};
pub use error::IoError;
pub use reader::{DatasetReader, REQUIRED_COLUMNS};
pub use writer::{ClassReport, FeatureWeight, HoldoutReport, REPORT_FILE, ReportWriter, TrainingReport};
