//! Minimal convex-solver boundary for the neutralization engine.
//!
//! The engine only ever needs one problem shape: minimize a linear
//! objective over a non-negative (optionally box-bounded) vector subject to
//! a single second-order-cone constraint `‖Ax + b‖₂ ≤ r`. [`ConeSolver`]
//! captures exactly that, so the engine is isolated from any particular
//! optimization backend; [`ProjectedGradientSolver`] is the in-crate
//! default.

pub mod error;
pub mod problem;
pub mod projected_gradient;

pub use error::SolverError;
pub use problem::{ConeProblem, NormConstraint};
pub use projected_gradient::ProjectedGradientSolver;

use ndarray::Array1;

/// A backend able to solve [`ConeProblem`]s.
pub trait ConeSolver: Send + Sync {
    /// Returns an (approximately) optimal vector, or an error — notably
    /// [`SolverError::Infeasible`] when no point satisfies the constraints.
    fn solve(&self, problem: &ConeProblem) -> Result<Array1<f64>, SolverError>;
}
