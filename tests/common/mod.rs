//! Shared fixtures for integration tests.

use std::fs;
use std::path::Path;

use load_dispatch::config::DispatchConfig;

/// Writes `contents` as the input CSV inside `dir` and returns a baseline
/// config pointed at it, with the output CSV alongside.
pub fn config_for_csv(dir: &Path, contents: &str) -> DispatchConfig {
    let input = dir.join("load.csv");
    fs::write(&input, contents).expect("input fixture should write");
    let mut config = DispatchConfig::baseline();
    config.input = input;
    config.output = dir.join("dispatch_results.csv");
    config
}

/// A well-formed three-hour input at 100/200/300 MW.
pub fn simple_csv() -> &'static str {
    "datetime,load_MW\n\
     2025-08-01T00:00:00Z,100\n\
     2025-08-01T01:00:00Z,200\n\
     2025-08-01T02:00:00Z,300\n"
}

/// Reads the output CSV back as `(served_mw, generation_mw)` columns.
pub fn read_output(path: &Path) -> (Vec<f64>, Vec<f64>) {
    let file = fs::File::open(path).expect("output file should exist");
    let mut rdr = csv::Reader::from_reader(file);
    let mut served = Vec::new();
    let mut generation = Vec::new();
    for record in rdr.records() {
        let record = record.expect("output row should parse");
        served.push(record[1].parse::<f64>().expect("served should be numeric"));
        generation.push(
            record[2]
                .parse::<f64>()
                .expect("generation should be numeric"),
        );
    }
    (served, generation)
}
