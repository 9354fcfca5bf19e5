//! Energy-balance dispatch: problem construction, solver back-ends,
//! ordered-fallback orchestration, and result extraction.

pub mod orchestrator;
pub mod problem;
pub mod result;
pub mod solvers;

// Re-export the main types for convenience
pub use orchestrator::{Orchestrator, SolveOutcome};
pub use problem::DispatchProblem;
pub use result::DispatchResult;
pub use solvers::Solver;
