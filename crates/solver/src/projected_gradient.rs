//! Projected-gradient penalty backend.
//!
//! Two phases over the box `0 ≤ x ≤ u`:
//!
//! 1. *Feasibility probe* — minimize `‖Ax + b‖²` by projected gradient; if
//!    the smallest reachable norm still exceeds the cone bound, the problem
//!    is infeasible.
//! 2. *Penalized descent* — minimize
//!    `c·x + μ · max(0, ‖Ax + b‖ − bound)²` for a growing sequence of
//!    penalty weights `μ`, then pull the iterate back onto the cone along
//!    the segment to the phase-1 point, which is feasible by construction.
//!
//! Deterministic and allocation-light; accuracy is bounded by the iteration
//! budgets, which is plenty for stake vectors that get rounded to one
//! decimal place downstream.

use crate::error::SolverError;
use crate::problem::ConeProblem;
use crate::ConeSolver;
use ndarray::Array1;
use tracing::debug;

/// Tunable projected-gradient solver.
#[derive(Debug, Clone)]
pub struct ProjectedGradientSolver {
    /// Iterations for the feasibility probe.
    pub feasibility_iters: usize,
    /// Gradient steps per penalty weight.
    pub inner_iters: usize,
    /// Number of penalty weights tried.
    pub penalty_rounds: usize,
    /// First penalty weight; grows geometrically.
    pub initial_penalty: f64,
    /// Multiplier between penalty rounds.
    pub penalty_growth: f64,
    /// Constraint tolerance.
    pub tolerance: f64,
}

impl Default for ProjectedGradientSolver {
    fn default() -> Self {
        Self {
            feasibility_iters: 4000,
            inner_iters: 2000,
            penalty_rounds: 6,
            initial_penalty: 10.0,
            penalty_growth: 10.0,
            tolerance: 1e-6,
        }
    }
}

/// Iterates above this norm are treated as a certificate of unboundedness.
const DIVERGENCE_LIMIT: f64 = 1e10;

impl ProjectedGradientSolver {
    /// Clamps a point into the box `0 ≤ x ≤ u`.
    fn project(x: &mut Array1<f64>, upper: Option<&Array1<f64>>) {
        match upper {
            Some(upper) => {
                for (v, &u) in x.iter_mut().zip(upper.iter()) {
                    *v = v.clamp(0.0, u.max(0.0));
                }
            }
            None => {
                for v in x.iter_mut() {
                    *v = v.max(0.0);
                }
            }
        }
    }

    /// Estimates `σ_max(A)²` by power iteration on `AᵀA`.
    fn spectral_norm_sq(problem: &ConeProblem) -> f64 {
        let a = &problem.cone.matrix;
        let n = problem.dim();
        if n == 0 || a.nrows() == 0 {
            return 0.0;
        }
        let mut v = Array1::from_elem(n, 1.0 / (n as f64).sqrt());
        let mut lambda = 0.0;
        for _ in 0..100 {
            let w = a.t().dot(&a.dot(&v));
            let norm = w.dot(&w).sqrt();
            if norm < 1e-18 {
                return 0.0;
            }
            lambda = v.dot(&w);
            v = w / norm;
        }
        // Safety margin keeps step sizes conservative.
        lambda.max(0.0) * 1.5
    }

    /// Phase 1: smallest reachable cone norm, or the first feasible point.
    fn feasibility_probe(
        &self,
        problem: &ConeProblem,
        lipschitz: f64,
    ) -> Result<Array1<f64>, SolverError> {
        let mut x = Array1::zeros(problem.dim());
        Self::project(&mut x, problem.upper_bounds.as_ref());
        if problem.cone_norm(&x) <= problem.cone.bound + self.tolerance {
            return Ok(x);
        }
        if lipschitz <= 0.0 {
            // Constant cone term: nothing can reduce it.
            return Err(SolverError::Infeasible);
        }

        let step = 1.0 / (2.0 * lipschitz);
        let a = &problem.cone.matrix;
        for _ in 0..self.feasibility_iters {
            let v = a.dot(&x) + &problem.cone.offset;
            let grad = a.t().dot(&v) * 2.0;
            x = &x - &(grad * step);
            Self::project(&mut x, problem.upper_bounds.as_ref());
            if problem.cone_norm(&x) <= problem.cone.bound + self.tolerance {
                return Ok(x);
            }
        }

        debug!(
            residual = problem.cone_norm(&x) - problem.cone.bound,
            "feasibility probe exhausted its budget"
        );
        Err(SolverError::Infeasible)
    }

    /// Closed form for a constant cone term: the objective separates per
    /// component over the box.
    fn solve_box_only(problem: &ConeProblem) -> Result<Array1<f64>, SolverError> {
        let mut x = Array1::zeros(problem.dim());
        for (i, &c) in problem.objective.iter().enumerate() {
            if c < 0.0 {
                match &problem.upper_bounds {
                    Some(upper) => x[i] = upper[i].max(0.0),
                    None => return Err(SolverError::Unbounded),
                }
            }
        }
        Ok(x)
    }

    /// Largest point along `[feasible, candidate]` still inside the cone.
    fn pull_back(
        problem: &ConeProblem,
        feasible: &Array1<f64>,
        candidate: &Array1<f64>,
        tol: f64,
    ) -> Array1<f64> {
        if problem.is_feasible(candidate, tol) {
            return candidate.clone();
        }
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            let point = feasible + &((candidate - feasible) * mid);
            if problem.cone_norm(&point) <= problem.cone.bound + tol {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        feasible + &((candidate - feasible) * lo)
    }
}

impl ConeSolver for ProjectedGradientSolver {
    fn solve(&self, problem: &ConeProblem) -> Result<Array1<f64>, SolverError> {
        problem.validate()?;
        if problem.cone.bound < 0.0 {
            return Err(SolverError::Infeasible);
        }

        let lipschitz = Self::spectral_norm_sq(problem);
        let feasible = self.feasibility_probe(problem, lipschitz)?;
        if lipschitz <= 0.0 {
            return Self::solve_box_only(problem);
        }

        let a = &problem.cone.matrix;
        let mut x = feasible.clone();
        let mut penalty = self.initial_penalty;

        for _ in 0..self.penalty_rounds {
            let step = 1.0 / (2.0 * penalty * lipschitz + 1.0);
            for _ in 0..self.inner_iters {
                let v = a.dot(&x) + &problem.cone.offset;
                let norm = v.dot(&v).sqrt();
                let excess = norm - problem.cone.bound;
                let mut grad = problem.objective.clone();
                if excess > 0.0 && norm > 1e-12 {
                    grad = grad + a.t().dot(&v) * (2.0 * penalty * excess / norm);
                }
                x = &x - &(grad * step);
                Self::project(&mut x, problem.upper_bounds.as_ref());
                if x.dot(&x).sqrt() > DIVERGENCE_LIMIT {
                    return Err(SolverError::Unbounded);
                }
            }
            penalty *= self.penalty_growth;
        }

        let solution = Self::pull_back(problem, &feasible, &x, self.tolerance);

        // Never return something worse than the plain feasible point.
        if problem.objective.dot(&solution) <= problem.objective.dot(&feasible) {
            Ok(solution)
        } else {
            Ok(feasible)
        }
    }
}
