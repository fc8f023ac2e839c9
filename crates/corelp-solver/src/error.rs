use thiserror::Error;

use crate::simplex::Phase;

/// Failures that abort a solve. A solve that ends Infeasible or Unbounded
/// is not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Singular basis matrix in {phase} at iteration {iteration}")]
    SingularBasis { phase: Phase, iteration: usize },
    #[error("Phase 1 found no blocking row at iteration {iteration}")]
    UnboundedPhaseOne { iteration: usize },
    #[error("Iteration limit of {iterations} exceeded in {phase}")]
    MaxIterationsExceeded { phase: Phase, iterations: usize },
    #[error("Branch-and-bound stopped after {nodes} nodes at depth {depth}; result unknown")]
    SearchIncomplete {
        nodes: usize,
        depth: usize,
        /// Best integer objective found before the guard tripped (minimization form)
        incumbent: Option<f64>,
    },
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("Solve cancelled")]
    Cancelled,
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
}

impl SolverError {
    /// Stable code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::InvalidDimensions(_) => "INVALID_DIMENSIONS",
            SolverError::InvalidConfig(_) => "INVALID_CONFIG",
            SolverError::SingularBasis { .. } => "SINGULAR_BASIS",
            SolverError::UnboundedPhaseOne { .. } => "UNBOUNDED_PHASE_ONE",
            SolverError::MaxIterationsExceeded { .. } => "MAX_ITERATIONS",
            SolverError::SearchIncomplete { .. } => "SEARCH_INCOMPLETE",
            SolverError::NotImplemented(_) => "NOT_IMPLEMENTED",
            SolverError::Cancelled => "CANCELLED",
            SolverError::UnknownVariable(_) => "UNKNOWN_VARIABLE",
        }
    }

    /// True for failures where the answer is unknown rather than wrong input.
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            SolverError::SingularBasis { .. }
                | SolverError::UnboundedPhaseOne { .. }
                | SolverError::MaxIterationsExceeded { .. }
        )
    }
}
