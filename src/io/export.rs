//! CSV export for the dispatched series.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::dispatch::result::DispatchResult;

/// Column header for the output series file.
const HEADER: &str = "datetime,load_MW,generator_MW";

/// Exports a dispatch result to a CSV file at the given path.
///
/// Writes a header row followed by one data row per timestamp. Served load
/// and generator output are equal by construction of the balance
/// constraint. Produces deterministic output for identical inputs.
///
/// # Arguments
///
/// * `result` - Solved dispatch series
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(result: &DispatchResult, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(result, buf)
}

/// Writes a dispatch result as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(result: &DispatchResult, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    // Header
    wtr.write_record(HEADER.split(','))?;

    // Data rows
    for row in result.rows() {
        wtr.write_record(&[
            row.timestamp.to_rfc3339(),
            format!("{:.3}", row.served_mw),
            format!("{:.3}", row.generation_mw),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
