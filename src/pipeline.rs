//! Strictly linear pipeline: ingest, normalize, dispatch, export.

use tracing::info;

use crate::config::DispatchConfig;
use crate::dispatch::{result, DispatchProblem, DispatchResult, Orchestrator};
use crate::error::PipelineError;
use crate::io::{export, import};
use crate::series::{self, TimeSeries};

/// Loads the input file and normalizes it into the hourly demand series.
///
/// # Errors
///
/// Fails on unreadable input, unresolvable columns, or an empty cleaned
/// series.
pub fn prepare_series(config: &DispatchConfig) -> Result<TimeSeries, PipelineError> {
    let raw = import::load_csv(&config.input, &config.columns.datetime, &config.columns.load)?;
    info!(
        rows = raw.len(),
        input = %config.input.display(),
        "loaded raw observations"
    );
    let demand = series::normalize(&raw)?;
    info!(
        steps = demand.len(),
        peak_mw = demand.peak_mw(),
        "normalized demand series"
    );
    Ok(demand)
}

/// Builds the dispatch problem and solves it with the configured candidate
/// order, extracting the verified result series.
///
/// # Errors
///
/// Fails on invalid generator parameters, with
/// [`PipelineError::AllSolversFailed`] when every candidate is exhausted,
/// or with [`PipelineError::ResultMismatch`] on a solver contract
/// violation.
pub fn dispatch(
    config: &DispatchConfig,
    demand: TimeSeries,
) -> Result<DispatchResult, PipelineError> {
    let problem = DispatchProblem::new(
        demand,
        config.generator.capacity_mw,
        config.generator.marginal_cost,
    )?;
    let orchestrator = Orchestrator::new(
        config.solver.order.clone(),
        config.solver.attempt_timeout(),
    );
    let outcome = orchestrator.solve(&problem)?;
    let dispatched = result::extract(&problem, outcome)?;
    info!(
        solver = dispatched.solver_id(),
        steps = dispatched.len(),
        total_cost = dispatched.total_cost(),
        "dispatch complete"
    );
    Ok(dispatched)
}

/// Runs the full pipeline and writes the output series file.
///
/// The output file is created only after a fully successful solve, so no
/// partial output exists on any failure path.
///
/// # Errors
///
/// Propagates the first stage failure.
pub fn run(config: &DispatchConfig) -> Result<DispatchResult, PipelineError> {
    let demand = prepare_series(config)?;
    let dispatched = dispatch(config, demand)?;
    export::export_csv(&dispatched, &config.output)?;
    info!(output = %config.output.display(), "results written");
    Ok(dispatched)
}
