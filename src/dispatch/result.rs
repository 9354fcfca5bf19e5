//! Extraction of solved trajectories into the output series.

use chrono::{DateTime, Utc};

use crate::dispatch::orchestrator::SolveOutcome;
use crate::dispatch::problem::DispatchProblem;
use crate::error::PipelineError;

/// One output row: timestamp, served load, generator output.
#[derive(Debug, Clone, Copy)]
pub struct ResultRow {
    /// Timestamp (UTC).
    pub timestamp: DateTime<Utc>,
    /// Served load (MW).
    pub served_mw: f64,
    /// Generator output (MW).
    pub generation_mw: f64,
}

/// The dispatched series over exactly the input index, plus provenance.
///
/// Created once per run from the accepted solution and immutable
/// thereafter.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    timestamps: Vec<DateTime<Utc>>,
    served_mw: Vec<f64>,
    generation_mw: Vec<f64>,
    solver_id: String,
    total_cost: f64,
}

impl DispatchResult {
    /// Number of timestamps in the result.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the result holds no rows.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The timestamp index, identical to the input demand index.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Served load trajectory (MW).
    pub fn served_mw(&self) -> &[f64] {
        &self.served_mw
    }

    /// Generator output trajectory (MW).
    pub fn generation_mw(&self) -> &[f64] {
        &self.generation_mw
    }

    /// Identifier of the back-end that produced the accepted solution.
    pub fn solver_id(&self) -> &str {
        &self.solver_id
    }

    /// Total dispatch cost: `marginal_cost * sum(generation)`.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Iterates over output rows in index order.
    pub fn rows(&self) -> impl Iterator<Item = ResultRow> + '_ {
        self.timestamps
            .iter()
            .zip(&self.served_mw)
            .zip(&self.generation_mw)
            .map(|((&timestamp, &served_mw), &generation_mw)| ResultRow {
                timestamp,
                served_mw,
                generation_mw,
            })
    }
}

/// Assembles the output series from a solved problem.
///
/// Served load is the demand series itself (the balance constraint pins
/// generation to it); generator output comes from the accepted solution.
///
/// # Errors
///
/// Returns [`PipelineError::ResultMismatch`] if the solution trajectory
/// does not cover the demand index one-to-one. That would indicate a
/// builder/solver contract violation, so it is checked before any
/// downstream consumption.
pub fn extract(
    problem: &DispatchProblem,
    outcome: SolveOutcome,
) -> Result<DispatchResult, PipelineError> {
    let demand = problem.demand();
    if outcome.generation_mw.len() != demand.len() {
        return Err(PipelineError::ResultMismatch {
            expected: demand.len(),
            actual: outcome.generation_mw.len(),
        });
    }
    let total_cost = outcome.generation_mw.iter().sum::<f64>() * problem.marginal_cost();
    Ok(DispatchResult {
        timestamps: demand.timestamps().to_vec(),
        served_mw: demand.values().to_vec(),
        generation_mw: outcome.generation_mw,
        solver_id: outcome.solver_id,
        total_cost,
    })
}
