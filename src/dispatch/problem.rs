//! Single-bus energy-balance dispatch problem.

use crate::error::PipelineError;
use crate::series::types::TimeSeries;

/// A single-bus dispatch problem: one load that must be served exactly and
/// one generator with a capacity bound and a linear marginal cost.
///
/// The balance constraint `generation[t] == load[t]` carries no coupling
/// across timestamps, so the problem is feasible iff `load[t] <= capacity`
/// for every t. That check is deliberately left to the solver; the builder
/// performs range checks only.
#[derive(Debug, Clone)]
pub struct DispatchProblem {
    demand: TimeSeries,
    capacity_mw: f64,
    marginal_cost: f64,
}

impl DispatchProblem {
    /// Builds a problem from a normalized demand series.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if the capacity is not a
    /// positive finite number or the marginal cost is not a non-negative
    /// finite number.
    pub fn new(
        demand: TimeSeries,
        capacity_mw: f64,
        marginal_cost: f64,
    ) -> Result<Self, PipelineError> {
        if !(capacity_mw.is_finite() && capacity_mw > 0.0) {
            return Err(PipelineError::InvalidParameter {
                field: "generator.capacity_mw".to_string(),
                message: format!("must be a positive finite number, got {capacity_mw}"),
            });
        }
        if !(marginal_cost.is_finite() && marginal_cost >= 0.0) {
            return Err(PipelineError::InvalidParameter {
                field: "generator.marginal_cost".to_string(),
                message: format!("must be a non-negative finite number, got {marginal_cost}"),
            });
        }
        Ok(Self {
            demand,
            capacity_mw,
            marginal_cost,
        })
    }

    /// The demand series the generator must serve.
    pub fn demand(&self) -> &TimeSeries {
        &self.demand
    }

    /// Generator capacity upper bound (MW).
    pub fn capacity_mw(&self) -> f64 {
        self.capacity_mw
    }

    /// Generator marginal cost (currency per MWh).
    pub fn marginal_cost(&self) -> f64 {
        self.marginal_cost
    }
}
