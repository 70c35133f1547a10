use thiserror::Error;

/// Errors a solver backend can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// No point satisfies the constraints.
    #[error("problem is infeasible")]
    Infeasible,

    /// The objective decreases without bound over the feasible set.
    #[error("problem is unbounded")]
    Unbounded,

    /// Problem arrays disagree on dimensions.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}
