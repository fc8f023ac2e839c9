//! Pluggable branch-and-bound strategies.
//!
//! Each seam is a trait with a safe default. Closures implement the traits
//! directly, so a caller can pass `|candidates| ...` where a strategy is
//! expected. Strategies travel inside [`crate::SolverConfig`]; nothing here
//! is global.

use std::fmt;
use std::sync::Arc;

use crate::branch_and_bound::Node;

/// An integer-category column whose relaxation value is fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FractionalColumn {
    pub column: usize,
    pub value: f64,
}

impl FractionalColumn {
    /// Distance to the nearest integer, in `[0, 0.5]`.
    pub fn fractionality(&self) -> f64 {
        let frac = self.value - self.value.floor();
        frac.min(1.0 - frac)
    }
}

/// Chooses the column to branch on.
pub trait BranchingStrategy: Send + Sync {
    /// Candidates arrive in column order. Return one of their `column` values.
    fn select(&self, candidates: &[FractionalColumn]) -> Option<usize>;

    fn name(&self) -> &str {
        "custom"
    }
}

/// Tries to produce an integer-feasible point for a node.
pub trait PrimalHeuristic: Send + Sync {
    /// A full-length candidate solution (slack columns included), or `None`.
    fn propose(&self, node: &Node) -> Option<Vec<f64>>;

    fn name(&self) -> &str {
        "custom"
    }
}

/// A valid inequality `coefficients·x ≤ rhs` over the node's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Cut {
    pub coefficients: Vec<f64>,
    pub rhs: f64,
}

/// Generates cutting planes for a node's relaxation.
pub trait CutGenerator: Send + Sync {
    fn generate(&self, node: &Node) -> Vec<Cut>;

    fn name(&self) -> &str {
        "custom"
    }
}

/// Branch on the first fractional column.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFractional;

impl BranchingStrategy for FirstFractional {
    fn select(&self, candidates: &[FractionalColumn]) -> Option<usize> {
        candidates.first().map(|c| c.column)
    }

    fn name(&self) -> &str {
        "first-fractional"
    }
}

/// Branch on the column closest to a half-integer. Earlier columns win ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct MostFractional;

impl BranchingStrategy for MostFractional {
    fn select(&self, candidates: &[FractionalColumn]) -> Option<usize> {
        let mut best: Option<&FractionalColumn> = None;
        for c in candidates {
            if best.is_none_or(|b| c.fractionality() > b.fractionality()) {
                best = Some(c);
            }
        }
        best.map(|c| c.column)
    }

    fn name(&self) -> &str {
        "most-fractional"
    }
}

/// Branch on the column closest to an integer. Earlier columns win ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeastFractional;

impl BranchingStrategy for LeastFractional {
    fn select(&self, candidates: &[FractionalColumn]) -> Option<usize> {
        let mut best: Option<&FractionalColumn> = None;
        for c in candidates {
            if best.is_none_or(|b| c.fractionality() < b.fractionality()) {
                best = Some(c);
            }
        }
        best.map(|c| c.column)
    }

    fn name(&self) -> &str {
        "least-fractional"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeuristic;

impl PrimalHeuristic for NoHeuristic {
    fn propose(&self, _node: &Node) -> Option<Vec<f64>> {
        None
    }

    fn name(&self) -> &str {
        "none"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCuts;

impl CutGenerator for NoCuts {
    fn generate(&self, _node: &Node) -> Vec<Cut> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "none"
    }
}

impl<F> BranchingStrategy for F
where
    F: Fn(&[FractionalColumn]) -> Option<usize> + Send + Sync,
{
    fn select(&self, candidates: &[FractionalColumn]) -> Option<usize> {
        self(candidates)
    }
}

impl<F> PrimalHeuristic for F
where
    F: Fn(&Node) -> Option<Vec<f64>> + Send + Sync,
{
    fn propose(&self, node: &Node) -> Option<Vec<f64>> {
        self(node)
    }
}

impl<F> CutGenerator for F
where
    F: Fn(&Node) -> Vec<Cut> + Send + Sync,
{
    fn generate(&self, node: &Node) -> Vec<Cut> {
        self(node)
    }
}

/// The strategy set used by one solve.
#[derive(Clone)]
pub struct Strategies {
    pub branching: Arc<dyn BranchingStrategy>,
    pub heuristic: Arc<dyn PrimalHeuristic>,
    pub cuts: Arc<dyn CutGenerator>,
}

impl Default for Strategies {
    fn default() -> Self {
        Self {
            branching: Arc::new(FirstFractional),
            heuristic: Arc::new(NoHeuristic),
            cuts: Arc::new(NoCuts),
        }
    }
}

impl fmt::Debug for Strategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategies")
            .field("branching", &self.branching.name())
            .field("heuristic", &self.heuristic.name())
            .field("cuts", &self.cuts.name())
            .finish()
    }
}
