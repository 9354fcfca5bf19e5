//! Cleaning and regularization of raw observations onto the hourly grid.

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use tracing::debug;

use crate::error::PipelineError;
use crate::series::types::{RawObservation, TimeSeries};

/// Longest run of consecutive missing hourly slots bridged by linear
/// interpolation. Longer gaps are zero-filled.
pub const MAX_INTERPOLATED_GAP: usize = 2;

/// Timestamp layouts carrying an explicit offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%z"];

/// Naive timestamp layouts, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// One hourly grid slot during normalization.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Slot {
    /// Mean of the numeric observations that fell into this hour.
    Known(f64),
    /// The hour carried only non-numeric quantities. Zero-filled in the
    /// coercion step; never used as an interpolation anchor.
    Corrupt,
    /// No observation fell into this hour.
    Missing,
}

/// Parses a timestamp cell into a timezone-aware instant.
///
/// Accepts RFC 3339, then the layouts in [`OFFSET_FORMATS`] and
/// [`NAIVE_FORMATS`]; naive timestamps are interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let text = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

/// Cleans raw observations into a gap-free hourly [`TimeSeries`].
///
/// Applies, in order: timestamp parsing (unparseable rows drop), missing
/// quantity dropping, stable sort, first-occurrence deduplication, hourly
/// resampling by bucket mean, linear interpolation of gaps up to
/// [`MAX_INTERPOLATED_GAP`] slots, zero-fill of corrupt and irrecoverable
/// slots, and a non-negativity clamp.
///
/// # Errors
///
/// Returns [`PipelineError::EmptySeries`] if no usable observation
/// survives.
pub fn normalize(raw: &[RawObservation]) -> Result<TimeSeries, PipelineError> {
    // Parse timestamps; drop unparseable rows and missing quantities.
    let mut rows: Vec<(DateTime<Utc>, &str)> = Vec::with_capacity(raw.len());
    for obs in raw {
        let Some(timestamp) = parse_timestamp(&obs.timestamp) else {
            continue;
        };
        let quantity = obs.quantity.trim();
        if quantity.is_empty() {
            continue;
        }
        rows.push((timestamp, quantity));
    }
    if rows.is_empty() {
        return Err(PipelineError::EmptySeries);
    }

    // Stable sort, then first occurrence per timestamp wins.
    rows.sort_by_key(|(timestamp, _)| *timestamp);
    rows.dedup_by_key(|(timestamp, _)| *timestamp);
    debug!(rows = rows.len(), "observations after parse, sort, dedup");

    // Resample onto the hourly grid spanning the observed range. Residual
    // same-bucket values aggregate by arithmetic mean.
    let start = floor_to_hour(rows[0].0);
    let end = floor_to_hour(rows[rows.len() - 1].0);
    let slots = usize::try_from((end - start).num_hours()).unwrap_or(0) + 1;

    let mut sums = vec![0.0_f64; slots];
    let mut counts = vec![0_u32; slots];
    let mut occupied = vec![false; slots];
    for (timestamp, text) in &rows {
        let idx = usize::try_from((floor_to_hour(*timestamp) - start).num_hours()).unwrap_or(0);
        occupied[idx] = true;
        if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() {
                sums[idx] += value;
                counts[idx] += 1;
            }
        }
    }

    let mut grid: Vec<Slot> = (0..slots)
        .map(|i| {
            if counts[i] > 0 {
                Slot::Known(sums[i] / f64::from(counts[i]))
            } else if occupied[i] {
                Slot::Corrupt
            } else {
                Slot::Missing
            }
        })
        .collect();

    interpolate_short_gaps(&mut grid);

    // Coerce what is still unknown to 0.0, then clamp negatives.
    let values: Vec<f64> = grid
        .iter()
        .map(|slot| match slot {
            Slot::Known(value) => value.max(0.0),
            Slot::Corrupt | Slot::Missing => 0.0,
        })
        .collect();
    let timestamps: Vec<DateTime<Utc>> = (0..slots)
        .map(|i| start + TimeDelta::hours(i as i64))
        .collect();

    Ok(TimeSeries::from_columns(timestamps, values))
}

/// Linearly fills runs of up to [`MAX_INTERPOLATED_GAP`] missing slots that
/// are bounded by known values on both sides. Runs touching a corrupt slot
/// or the grid edge stay missing.
fn interpolate_short_gaps(grid: &mut [Slot]) {
    let mut i = 0;
    while i < grid.len() {
        if grid[i] != Slot::Missing {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < grid.len() && grid[i] == Slot::Missing {
            i += 1;
        }
        let run_len = i - run_start;
        if run_len > MAX_INTERPOLATED_GAP || run_start == 0 || i == grid.len() {
            continue;
        }
        let (Slot::Known(before), Slot::Known(after)) = (grid[run_start - 1], grid[i]) else {
            continue;
        };
        let step = (after - before) / (run_len as f64 + 1.0);
        for (k, slot) in grid[run_start..i].iter_mut().enumerate() {
            *slot = Slot::Known(before + step * (k as f64 + 1.0));
        }
    }
}

/// Truncates an instant to the start of its hour.
fn floor_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    let subsec = i64::from(timestamp.timestamp_subsec_nanos());
    timestamp
        - TimeDelta::seconds(timestamp.timestamp().rem_euclid(3600))
        - TimeDelta::nanoseconds(subsec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn raw(timestamp: &str, quantity: &str) -> RawObservation {
        RawObservation::new(timestamp, quantity)
    }

    fn hourly(raws: &[RawObservation]) -> TimeSeries {
        normalize(raws).expect("series should normalize")
    }

    #[test]
    fn parses_rfc3339() {
        let ts = parse_timestamp("2025-08-01T12:00:00Z").expect("should parse");
        assert_eq!(ts.hour(), 12);
    }

    #[test]
    fn parses_offset_and_converts_to_utc() {
        let ts = parse_timestamp("2025-08-01 14:00:00+02:00").expect("should parse");
        assert_eq!(ts.hour(), 12);
    }

    #[test]
    fn parses_naive_as_utc() {
        let ts = parse_timestamp("2025-08-01 05:30:00").expect("should parse");
        assert_eq!(ts.hour(), 5);
        assert_eq!(ts.minute(), 30);
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("not a date").is_none());
    }

    #[test]
    fn empty_input_is_empty_series_error() {
        let err = normalize(&[]).expect_err("empty input should fail");
        assert!(matches!(err, PipelineError::EmptySeries));
    }

    #[test]
    fn all_rows_unusable_is_empty_series_error() {
        let raws = [raw("garbage", "100"), raw("2025-08-01T00:00:00Z", "  ")];
        let err = normalize(&raws).expect_err("no usable rows should fail");
        assert!(matches!(err, PipelineError::EmptySeries));
    }

    #[test]
    fn unparseable_timestamp_rows_drop() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("yesterday-ish", "9999"),
            raw("2025-08-01T01:00:00Z", "200"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[100.0, 200.0]);
    }

    #[test]
    fn missing_quantity_rows_drop() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("2025-08-01T01:00:00Z", ""),
            raw("2025-08-01T02:00:00Z", "300"),
        ];
        // The 01:00 row drops, leaving a one-slot gap that interpolates.
        let series = hourly(&raws);
        assert_eq!(series.values(), &[100.0, 200.0, 300.0]);
    }

    #[test]
    fn output_index_is_uniform_hourly_and_increasing() {
        let raws = [
            raw("2025-08-01T06:45:00Z", "100"),
            raw("2025-08-01T00:10:00Z", "50"),
            raw("2025-08-01T03:00:00Z", "75"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.len(), 7);
        for pair in series.timestamps().windows(2) {
            assert_eq!(pair[1] - pair[0], TimeDelta::hours(1));
        }
        assert_eq!(series.timestamps()[0].minute(), 0);
    }

    #[test]
    fn duplicate_timestamp_keeps_first_occurrence() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("2025-08-01T00:00:00Z", "120"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[100.0]);
    }

    #[test]
    fn same_hour_distinct_timestamps_average() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("2025-08-01T00:30:00Z", "200"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[150.0]);
    }

    #[test]
    fn two_slot_gap_interpolates_linearly() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("2025-08-01T03:00:00Z", "160"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.len(), 4);
        assert!((series.values()[1] - 120.0).abs() < 1e-9);
        assert!((series.values()[2] - 140.0).abs() < 1e-9);
    }

    #[test]
    fn three_slot_gap_zero_fills() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("2025-08-01T04:00:00Z", "160"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[100.0, 0.0, 0.0, 0.0, 160.0]);
    }

    #[test]
    fn corrupt_quantity_zero_fills() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("2025-08-01T01:00:00Z", "n/a"),
            raw("2025-08-01T02:00:00Z", "300"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[100.0, 0.0, 300.0]);
    }

    #[test]
    fn non_finite_quantity_is_corrupt() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "100"),
            raw("2025-08-01T01:00:00Z", "NaN"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[100.0, 0.0]);
    }

    #[test]
    fn gap_bounded_by_corrupt_slot_is_not_interpolated() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "broken"),
            raw("2025-08-01T03:00:00Z", "160"),
        ];
        // Slots 1-2 are missing but the left anchor is corrupt.
        let series = hourly(&raws);
        assert_eq!(series.values(), &[0.0, 0.0, 0.0, 160.0]);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        let raws = [
            raw("2025-08-01T00:00:00Z", "-25"),
            raw("2025-08-01T01:00:00Z", "40"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[0.0, 40.0]);
    }

    #[test]
    fn unsorted_input_sorts_ascending() {
        let raws = [
            raw("2025-08-01T02:00:00Z", "3"),
            raw("2025-08-01T00:00:00Z", "1"),
            raw("2025-08-01T01:00:00Z", "2"),
        ];
        let series = hourly(&raws);
        assert_eq!(series.values(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raws = [
            raw("2025-08-01T00:20:00Z", "100"),
            raw("2025-08-01T03:00:00Z", "160"),
            raw("2025-08-01T04:00:00Z", "-5"),
            raw("2025-08-01T06:00:00Z", "junk"),
        ];
        let once = hourly(&raws);
        let fed_back: Vec<RawObservation> = once
            .iter()
            .map(|obs| raw(&obs.timestamp.to_rfc3339(), &obs.load_mw.to_string()))
            .collect();
        let twice = hourly(&fed_back);
        assert_eq!(once, twice);
    }
}
