use crate::status::SolverStatus;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The result of solving a [`crate::Model`], in the model's own terms.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Solution {
    pub status: SolverStatus,
    /// Optimal objective value, in the model's sense
    pub objective_value: f64,
    /// Optimal values for each variable
    pub values: Vec<f64>,
    /// Per constraint: slack or surplus at the optimum, `None` for equalities
    pub slacks: Vec<Option<f64>>,
    /// Shadow prices per constraint: change in objective per unit increase of
    /// the rhs. Empty for integer models.
    pub duals: Vec<f64>,
    /// Branch-and-bound nodes explored; zero for linear models
    pub nodes_explored: usize,
    /// Simplex pivots across every relaxation solved
    pub iterations: usize,
}

impl Solution {
    pub fn infeasible() -> Self {
        Self::terminal(SolverStatus::Infeasible, f64::INFINITY)
    }

    pub fn unbounded() -> Self {
        Self::terminal(SolverStatus::Unbounded, f64::NEG_INFINITY)
    }

    fn terminal(status: SolverStatus, objective_value: f64) -> Self {
        Self {
            status,
            objective_value,
            values: Vec::new(),
            slacks: Vec::new(),
            duals: Vec::new(),
            nodes_explored: 0,
            iterations: 0,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Value of variable `index`, if a solution exists.
    pub fn value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }
}
