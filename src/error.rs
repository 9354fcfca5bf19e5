//! Error taxonomy for the dispatch pipeline.

use std::time::Duration;

use thiserror::Error;

/// Failure of a single candidate-solver attempt.
///
/// The orchestrator absorbs these and advances to the next candidate; they
/// only reach the caller inside [`PipelineError::AllSolversFailed`]. The
/// variants deliberately do not distinguish an unfixable problem (an
/// infeasible model) from a missing tool (an unknown identifier) when
/// deciding whether to advance.
#[derive(Debug, Clone, Error)]
pub enum SolverAttemptError {
    /// The identifier does not resolve to any compiled-in back-end.
    #[error("unknown solver \"{0}\"")]
    UnknownSolver(String),

    /// The back-end rejected the problem: infeasible, unbounded, or an
    /// internal solver failure.
    #[error("solver \"{id}\" failed: {message}")]
    Backend { id: String, message: String },

    /// The attempt exceeded its time budget and was abandoned.
    #[error("solver \"{id}\" timed out after {budget:?}")]
    Timeout { id: String, budget: Duration },

    /// The worker thread died without delivering a result.
    #[error("solver \"{id}\" worker exited without a result")]
    WorkerLost { id: String },
}

/// Fatal pipeline errors; each terminates the run at the stage where it
/// occurs. No output file is written on any of these paths.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required input column matched none of its candidate names.
    #[error(
        "could not find a {kind} column; tried any of [{}]; available columns: [{}]",
        .candidates.join(", "),
        .available.join(", ")
    )]
    ColumnNotFound {
        kind: &'static str,
        candidates: Vec<String>,
        available: Vec<String>,
    },

    /// No usable observation survived cleaning.
    #[error("no usable observations remain after cleaning")]
    EmptySeries,

    /// A model or configuration parameter failed its range check.
    #[error("invalid {field}: {message}")]
    InvalidParameter { field: String, message: String },

    /// Every candidate solver was attempted and failed.
    #[error(
        "all {} candidate solvers failed; last error: {}",
        .attempts.len(),
        last_attempt(.attempts)
    )]
    AllSolversFailed { attempts: Vec<SolverAttemptError> },

    /// The solver's output trajectory does not cover the demand index.
    #[error(
        "solver output does not match the demand index: expected {expected} values, got {actual}"
    )]
    ResultMismatch { expected: usize, actual: usize },

    /// Underlying file I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV input.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

fn last_attempt(attempts: &[SolverAttemptError]) -> String {
    attempts
        .last()
        .map_or_else(|| "none recorded".to_string(), ToString::to_string)
}
