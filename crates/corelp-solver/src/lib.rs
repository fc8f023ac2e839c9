mod branch_and_bound;
mod config;
mod error;
mod formulate;
mod linalg;
mod problem;
mod scf;
mod simplex;
mod solution;
mod solver;
mod status;
mod strategy;

pub use branch_and_bound::{BranchAndBound, BranchDecision, BranchDirection, IntegerProgram, Node};
pub use config::SolverConfig;
pub use error::SolverError;
pub use formulate::{Formulation, formulate};
pub use linalg::{LuFactorization, Matrix};
pub use problem::{Constraint, ConstraintOp, Model, Objective, Sense, Variable, VariableCategory};
pub use scf::StandardComputationalForm;
pub use simplex::{Phase, RevisedSimplex};
pub use solution::Solution;
pub use solver::Solver;
pub use status::SolverStatus;
pub use strategy::{
    BranchingStrategy, Cut, CutGenerator, FirstFractional, FractionalColumn, LeastFractional, MostFractional,
    NoCuts, NoHeuristic, PrimalHeuristic, Strategies,
};
