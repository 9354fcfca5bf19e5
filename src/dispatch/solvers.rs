//! Candidate solver back-ends behind a common solving capability.

use good_lp::{constraint, variable, Expression, ProblemVariables, Solution, SolverModel, Variable};

use crate::dispatch::problem::DispatchProblem;
use crate::error::SolverAttemptError;

/// A solving capability: accepts a dispatch problem and returns the
/// generator trajectory (one MW value per demand timestamp) or fails.
///
/// Implementations must be `Send` so an attempt can run on its own worker
/// thread under the orchestrator's time budget.
pub trait Solver: Send {
    /// Stable identifier used in configuration and result reporting.
    fn id(&self) -> &'static str;

    /// Solves the problem.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverAttemptError`] on any failure, including an
    /// infeasible problem.
    fn solve(&self, problem: &DispatchProblem) -> Result<Vec<f64>, SolverAttemptError>;
}

/// All identifiers that resolve to a back-end, in default preference order.
pub const BACKEND_IDS: &[&str] = &["microlp", "clarabel"];

/// Resolves a configured identifier to a compiled-in back-end.
///
/// A `None` here is not a pre-flight availability check: the orchestrator
/// turns it into a failed attempt, keeping discover-by-use semantics.
pub fn backend_for(id: &str) -> Option<Box<dyn Solver>> {
    match id {
        "microlp" => Some(Box::new(Microlp)),
        "clarabel" => Some(Box::new(Clarabel)),
        _ => None,
    }
}

/// Pure-Rust simplex back-end.
pub struct Microlp;

impl Solver for Microlp {
    fn id(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, problem: &DispatchProblem) -> Result<Vec<f64>, SolverAttemptError> {
        solve_linear(problem, good_lp::microlp, self.id())
    }
}

/// Pure-Rust interior-point back-end.
pub struct Clarabel;

impl Solver for Clarabel {
    fn id(&self) -> &'static str {
        "clarabel"
    }

    fn solve(&self, problem: &DispatchProblem) -> Result<Vec<f64>, SolverAttemptError> {
        solve_linear(problem, good_lp::clarabel, self.id())
    }
}

/// Formulates the energy balance as an LP and solves it with the given
/// `good_lp` back-end: minimize `sum(marginal_cost * gen[t])` subject to
/// `0 <= gen[t] <= capacity` and `gen[t] == load[t]` for every t.
fn solve_linear<S>(
    problem: &DispatchProblem,
    backend: S,
    id: &str,
) -> Result<Vec<f64>, SolverAttemptError>
where
    S: good_lp::Solver,
{
    let mut vars = ProblemVariables::new();
    let r#gen: Vec<Variable> = problem
        .demand()
        .values()
        .iter()
        .map(|_| vars.add(variable().min(0.0).max(problem.capacity_mw())))
        .collect();
    let objective: Expression = r#gen.iter().map(|&g| g * problem.marginal_cost()).sum();

    let mut model = vars.minimise(objective).using(backend);
    for (&g, &load_mw) in r#gen.iter().zip(problem.demand().values()) {
        model = model.with(constraint!(g == load_mw));
    }

    let solution = model.solve().map_err(|e| SolverAttemptError::Backend {
        id: id.to_string(),
        message: e.to_string(),
    })?;
    Ok(r#gen.iter().map(|&g| solution.value(g)).collect())
}
