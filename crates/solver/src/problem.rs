use crate::error::SolverError;
use ndarray::{Array1, Array2};

/// The single second-order-cone constraint `‖matrix · x + offset‖₂ ≤ bound`.
#[derive(Debug, Clone)]
pub struct NormConstraint {
    pub matrix: Array2<f64>,
    pub offset: Array1<f64>,
    pub bound: f64,
}

/// Minimize `objective · x` subject to `x ≥ 0`, optional per-component
/// upper bounds, and one norm constraint.
#[derive(Debug, Clone)]
pub struct ConeProblem {
    pub objective: Array1<f64>,
    /// Per-component caps on `x`; `None` leaves `x` unbounded above.
    pub upper_bounds: Option<Array1<f64>>,
    pub cone: NormConstraint,
}

impl ConeProblem {
    /// Number of decision variables.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.objective.len()
    }

    /// Checks that all arrays agree on dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::DimensionMismatch`] when they do not.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.dim();
        let (rows, cols) = self.cone.matrix.dim();
        if cols != n {
            return Err(SolverError::DimensionMismatch(format!(
                "cone matrix has {cols} columns for {n} variables"
            )));
        }
        if self.cone.offset.len() != rows {
            return Err(SolverError::DimensionMismatch(format!(
                "cone offset has {} entries for {rows} rows",
                self.cone.offset.len()
            )));
        }
        if let Some(upper) = &self.upper_bounds {
            if upper.len() != n {
                return Err(SolverError::DimensionMismatch(format!(
                    "upper bounds have {} entries for {n} variables",
                    upper.len()
                )));
            }
        }
        Ok(())
    }

    /// `‖Ax + b‖₂` at a point.
    #[must_use]
    pub fn cone_norm(&self, x: &Array1<f64>) -> f64 {
        let v = self.cone.matrix.dot(x) + &self.cone.offset;
        v.dot(&v).sqrt()
    }

    /// Whether a point satisfies every constraint, within `tol`.
    #[must_use]
    pub fn is_feasible(&self, x: &Array1<f64>, tol: f64) -> bool {
        if x.iter().any(|&v| v < -tol) {
            return false;
        }
        if let Some(upper) = &self.upper_bounds {
            if x.iter().zip(upper.iter()).any(|(&v, &u)| v > u + tol) {
                return false;
            }
        }
        self.cone_norm(x) <= self.cone.bound + tol
    }
}
