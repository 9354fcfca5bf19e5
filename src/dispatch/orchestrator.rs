//! Ordered-fallback solving with a per-attempt time budget.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::dispatch::problem::DispatchProblem;
use crate::dispatch::solvers::{self, Solver};
use crate::error::{PipelineError, SolverAttemptError};

/// The accepted solution of one candidate back-end.
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    /// Generator trajectory, one MW value per demand timestamp.
    pub generation_mw: Vec<f64>,
    /// Identifier of the back-end that produced it.
    pub solver_id: String,
}

/// Attempts candidate solvers in order and accepts the first success.
///
/// Every attempt failure is treated the same, whatever its cause: unknown
/// identifier, backend rejection (including infeasibility), timeout, or a
/// lost worker. The failure is logged, recorded, and the next candidate is
/// tried. No retries of an earlier candidate, no comparison across
/// back-ends.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    order: Vec<String>,
    attempt_timeout: Duration,
}

impl Orchestrator {
    /// Creates an orchestrator over the given candidate order.
    ///
    /// # Arguments
    ///
    /// * `order` - Candidate identifiers, tried front to back
    /// * `attempt_timeout` - Time budget per attempt, not per orchestration
    pub fn new(order: Vec<String>, attempt_timeout: Duration) -> Self {
        Self {
            order,
            attempt_timeout,
        }
    }

    /// Solves with the compiled-in back-end registry.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AllSolversFailed`] with the recorded
    /// attempt errors once every candidate has failed.
    pub fn solve(&self, problem: &DispatchProblem) -> Result<SolveOutcome, PipelineError> {
        self.solve_with(problem, solvers::backend_for)
    }

    /// Solves with a caller-supplied identifier lookup.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::AllSolversFailed`] once every candidate has
    /// failed.
    pub fn solve_with<F>(
        &self,
        problem: &DispatchProblem,
        lookup: F,
    ) -> Result<SolveOutcome, PipelineError>
    where
        F: Fn(&str) -> Option<Box<dyn Solver>>,
    {
        let mut attempts = Vec::new();
        for id in &self.order {
            match self.attempt(id, problem, &lookup) {
                Ok(generation_mw) => {
                    info!(solver = %id, "solver attempt succeeded");
                    return Ok(SolveOutcome {
                        generation_mw,
                        solver_id: id.clone(),
                    });
                }
                Err(e) => {
                    warn!(solver = %id, error = %e, "solver attempt failed, advancing");
                    attempts.push(e);
                }
            }
        }
        Err(PipelineError::AllSolversFailed { attempts })
    }

    /// Runs one attempt on a worker thread under the attempt budget.
    ///
    /// A worker that outlives the budget is abandoned, never joined; it
    /// dies with the process. The abandonment is what keeps a hung
    /// back-end from blocking the next candidate.
    fn attempt<F>(
        &self,
        id: &str,
        problem: &DispatchProblem,
        lookup: &F,
    ) -> Result<Vec<f64>, SolverAttemptError>
    where
        F: Fn(&str) -> Option<Box<dyn Solver>>,
    {
        let solver = lookup(id).ok_or_else(|| SolverAttemptError::UnknownSolver(id.to_string()))?;
        let (tx, rx) = mpsc::channel();
        let worker_problem = problem.clone();
        let spawned = thread::Builder::new()
            .name(format!("solver-{id}"))
            .spawn(move || {
                let _ = tx.send(solver.solve(&worker_problem));
            });
        if let Err(e) = spawned {
            return Err(SolverAttemptError::Backend {
                id: id.to_string(),
                message: format!("failed to spawn worker: {e}"),
            });
        }

        match rx.recv_timeout(self.attempt_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(SolverAttemptError::Timeout {
                id: id.to_string(),
                budget: self.attempt_timeout,
            }),
            Err(RecvTimeoutError::Disconnected) => Err(SolverAttemptError::WorkerLost {
                id: id.to_string(),
            }),
        }
    }
}
