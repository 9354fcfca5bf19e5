//! CSV ingestion: schema resolution and raw observation loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::error::PipelineError;
use crate::series::types::RawObservation;

/// Resolves one required column against a prioritized candidate list.
///
/// For each candidate in list order, an exact header match is tried first,
/// then a case-insensitive one. The first candidate that matches by either
/// path wins, so an earlier candidate beats a later one even when the
/// earlier match is only case-insensitive.
///
/// # Errors
///
/// Returns [`PipelineError::ColumnNotFound`] naming the kind sought, the
/// candidates tried, and the available columns.
pub fn resolve_column(
    headers: &StringRecord,
    candidates: &[String],
    kind: &'static str,
) -> Result<usize, PipelineError> {
    for candidate in candidates {
        if let Some(idx) = headers.iter().position(|h| h == candidate) {
            return Ok(idx);
        }
        if let Some(idx) = headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(candidate))
        {
            return Ok(idx);
        }
    }
    Err(PipelineError::ColumnNotFound {
        kind,
        candidates: candidates.to_vec(),
        available: headers.iter().map(str::to_string).collect(),
    })
}

/// Reads raw observations from a CSV file using the configured candidate
/// column names.
///
/// # Errors
///
/// Fails if the file cannot be opened, the CSV is malformed, or either
/// required column is absent.
pub fn load_csv(
    path: &Path,
    datetime_candidates: &[String],
    load_candidates: &[String],
) -> Result<Vec<RawObservation>, PipelineError> {
    let file = File::open(path)?;
    let observations = read_observations(file, datetime_candidates, load_candidates)?;
    debug!(
        rows = observations.len(),
        path = %path.display(),
        "read raw observations"
    );
    Ok(observations)
}

/// Reads raw observations from any CSV reader.
///
/// Cell text is carried verbatim; short records yield empty cells, which
/// fall to the normalizer's drop policy.
///
/// # Errors
///
/// Fails on malformed CSV or if either required column is absent.
pub fn read_observations(
    reader: impl Read,
    datetime_candidates: &[String],
    load_candidates: &[String],
) -> Result<Vec<RawObservation>, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let datetime_idx = resolve_column(&headers, datetime_candidates, "datetime")?;
    let load_idx = resolve_column(&headers, load_candidates, "load")?;

    let mut observations = Vec::new();
    for record in rdr.records() {
        let record = record?;
        observations.push(RawObservation::new(
            record.get(datetime_idx).unwrap_or(""),
            record.get(load_idx).unwrap_or(""),
        ));
    }
    Ok(observations)
}
