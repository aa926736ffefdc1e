//! Missing-value handling for raw training rows.

use tracing::{info, instrument};

use crate::domain::{CleanedDataset, CleaningSummary, RawRecord, TrainingRecord, UNKNOWN};
use crate::IoError;

/// Cell texts treated as missing, after trimming. Mirrors the default NA
/// markers of common dataframe CSV readers.
const NA_MARKERS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A",
    "#NA", "<NA>",
];

/// Whether a raw cell counts as missing.
#[must_use]
pub fn is_missing(cell: &str) -> bool {
    NA_MARKERS.contains(&cell.trim())
}

/// Median of `values`; the mean of the two middle values for an even count.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Drop rows without a Disease and fill the remaining gaps.
///
/// Missing Symptoms and Sex become [`UNKNOWN`]; missing Age becomes the
/// median age of the kept rows.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::EmptyDataset`] | every row lacks a Disease |
/// | [`IoError::NoAgeValues`] | an age is missing and no kept row has one |
#[instrument(skip_all, fields(n_rows = raw.len()))]
pub fn clean(raw: Vec<RawRecord>) -> Result<CleanedDataset, IoError> {
    let rows_read = raw.len();
    let kept: Vec<(String, RawRecord)> = raw
        .into_iter()
        .filter_map(|mut r| r.disease.take().map(|d| (d, r)))
        .collect();
    if kept.is_empty() {
        return Err(IoError::EmptyDataset);
    }

    let ages: Vec<f64> = kept.iter().filter_map(|(_, r)| r.age).collect();
    let age_filled = kept.len() - ages.len();
    let median_age = match median(&ages) {
        Some(m) => m,
        None => return Err(IoError::NoAgeValues),
    };

    let mut summary = CleaningSummary {
        rows_read,
        rows_dropped: rows_read - kept.len(),
        symptoms_filled: 0,
        sex_filled: 0,
        age_filled,
        median_age,
    };

    let records = kept
        .into_iter()
        .map(|(disease, r)| TrainingRecord {
            disease,
            symptoms: r.symptoms.unwrap_or_else(|| {
                summary.symptoms_filled += 1;
                UNKNOWN.to_string()
            }),
            age: r.age.unwrap_or(median_age),
            sex: r.sex.unwrap_or_else(|| {
                summary.sex_filled += 1;
                UNKNOWN.to_string()
            }),
        })
        .collect();

    info!(
        rows_read,
        rows_dropped = summary.rows_dropped,
        symptoms_filled = summary.symptoms_filled,
        sex_filled = summary.sex_filled,
        age_filled,
        median_age,
        "dataset cleaned"
    );

    Ok(CleanedDataset::new(records, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(disease: Option<&str>, symptoms: Option<&str>, age: Option<f64>, sex: Option<&str>) -> RawRecord {
        RawRecord {
            disease: disease.map(str::to_string),
            symptoms: symptoms.map(str::to_string),
            age,
            sex: sex.map(str::to_string),
        }
    }

    #[test]
    fn na_markers() {
        for cell in ["", "  ", "NA", "NaN", "null", "None", "#N/A", "<NA>", " n/a "] {
            assert!(is_missing(cell), "{cell:?} should be missing");
        }
        for cell in ["0", "unknown", "none", "female", "cough"] {
            assert!(!is_missing(cell), "{cell:?} should be present");
        }
    }

    #[test]
    fn median_odd_even_empty() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn drops_rows_without_disease() {
        let cleaned = clean(vec![
            row(Some("Asthma"), Some("cough"), Some(30.0), Some("female")),
            row(None, Some("cough"), Some(40.0), Some("male")),
        ])
        .unwrap();
        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.summary().rows_read, 2);
        assert_eq!(cleaned.summary().rows_dropped, 1);
    }

    #[test]
    fn fills_text_with_unknown_and_age_with_median_of_kept_rows() {
        let cleaned = clean(vec![
            row(Some("Asthma"), None, Some(20.0), Some("female")),
            row(Some("Flu"), Some("fever"), None, None),
            row(Some("Flu"), Some("chills"), Some(40.0), Some("male")),
            // Dropped row: its age must not shift the median.
            row(None, Some("rash"), Some(90.0), Some("male")),
        ])
        .unwrap();

        let records = cleaned.records();
        assert_eq!(records[0].symptoms, UNKNOWN);
        assert_eq!(records[1].sex, UNKNOWN);
        assert_eq!(records[1].age, 30.0);
        assert_eq!(records[2].age, 40.0);

        let summary = cleaned.summary();
        assert_eq!(summary.symptoms_filled, 1);
        assert_eq!(summary.sex_filled, 1);
        assert_eq!(summary.age_filled, 1);
        assert_eq!(summary.median_age, 30.0);
    }

    #[test]
    fn empty_and_ageless_datasets_fail() {
        assert!(matches!(clean(vec![]), Err(IoError::EmptyDataset)));
        assert!(matches!(
            clean(vec![row(None, Some("cough"), Some(3.0), None)]),
            Err(IoError::EmptyDataset)
        ));
        assert!(matches!(
            clean(vec![row(Some("Flu"), Some("fever"), None, Some("male"))]),
            Err(IoError::NoAgeValues)
        ));
    }
}
