//! Per-solve configuration shared by the simplex and branch-and-bound engines.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::SolverError;
use crate::strategy::{BranchingStrategy, CutGenerator, PrimalHeuristic, Strategies};

/// Options consumed by both engines.
///
/// One value is threaded down the whole call chain of a solve, strategies
/// included, so independent solves in one process never share state.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// A column enters only if its reduced cost is below `-tolerance`
    pub tolerance: f64,
    /// Phase-1 objective above this means infeasible; also the smallest
    /// direction entry accepted as a pivot
    pub feasibility_tolerance: f64,
    /// Distance from the nearest integer still counted as integral
    pub integrality_tolerance: f64,
    /// An integer point replaces the incumbent only if better by more than this
    pub improvement_tolerance: f64,
    /// Pivot cap per simplex phase
    pub max_iterations: usize,
    /// Deepest branch-and-bound node allowed
    pub max_depth: usize,
    /// Most branch-and-bound nodes allowed
    pub max_nodes: usize,
    /// Relative gap under which a node's bound is not worth exploring
    pub gap_sensitivity: f64,
    /// Emit one diagnostic record per pivot and per node
    pub logging: bool,
    /// Reserved; only single-threaded solving exists
    pub threads: usize,
    pub strategies: Strategies,
    /// Checked between pivots and between nodes
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            feasibility_tolerance: 1e-8,
            integrality_tolerance: 1e-5,
            improvement_tolerance: 1e-8,
            max_iterations: 1000,
            max_depth: 256,
            max_nodes: 100_000,
            gap_sensitivity: 0.05,
            logging: false,
            threads: 1,
            strategies: Strategies::default(),
            cancel: None,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_feasibility_tolerance(mut self, tol: f64) -> Self {
        self.feasibility_tolerance = tol;
        self
    }

    pub fn with_integrality_tolerance(mut self, tol: f64) -> Self {
        self.integrality_tolerance = tol;
        self
    }

    pub fn with_improvement_tolerance(mut self, tol: f64) -> Self {
        self.improvement_tolerance = tol;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_nodes(mut self, nodes: usize) -> Self {
        self.max_nodes = nodes;
        self
    }

    pub fn with_gap_sensitivity(mut self, gap: f64) -> Self {
        self.gap_sensitivity = gap;
        self
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging = enabled;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_branching(mut self, strategy: impl BranchingStrategy + 'static) -> Self {
        self.strategies.branching = Arc::new(strategy);
        self
    }

    pub fn with_heuristic(mut self, heuristic: impl PrimalHeuristic + 'static) -> Self {
        self.strategies.heuristic = Arc::new(heuristic);
        self
    }

    pub fn with_cuts(mut self, cuts: impl CutGenerator + 'static) -> Self {
        self.strategies.cuts = Arc::new(cuts);
        self
    }

    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Reject values the engines cannot work with.
    pub fn validate(&self) -> Result<(), SolverError> {
        let positive = [
            ("tolerance", self.tolerance),
            ("feasibility_tolerance", self.feasibility_tolerance),
            ("integrality_tolerance", self.integrality_tolerance),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolverError::InvalidConfig(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.integrality_tolerance >= 0.5 {
            return Err(SolverError::InvalidConfig(format!(
                "integrality_tolerance must be below 0.5, got {}",
                self.integrality_tolerance
            )));
        }
        let non_negative = [
            ("improvement_tolerance", self.improvement_tolerance),
            ("gap_sensitivity", self.gap_sensitivity),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SolverError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig("max_iterations must be at least 1".to_string()));
        }
        if self.max_nodes == 0 {
            return Err(SolverError::InvalidConfig("max_nodes must be at least 1".to_string()));
        }
        if self.threads != 1 {
            return Err(SolverError::NotImplemented("multi-threaded solving (threads must be 1)"));
        }
        Ok(())
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}
