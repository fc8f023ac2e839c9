use tracing::debug;

use crate::branch_and_bound::{BranchAndBound, IntegerProgram};
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::formulate::{Formulation, formulate};
use crate::problem::Model;
use crate::simplex::RevisedSimplex;
use crate::solution::Solution;
use crate::status::SolverStatus;

/// Solves a [`Model`]: revised simplex for linear models, branch-and-bound
/// when any variable is integer or binary.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.config.tolerance = tol;
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn solve(&self, model: &Model) -> Result<Solution, SolverError> {
        self.config.validate()?;
        let formulation = formulate(model)?;

        if self.config.logging {
            debug!(
                component = "solver",
                operation = "formulate",
                model = model.name.as_str(),
                rows = formulation.scf.num_rows(),
                columns = formulation.scf.num_cols(),
                integer = model.is_integer(),
            );
        }

        if model.is_integer() {
            self.solve_integer(formulation)
        } else {
            self.solve_linear(formulation)
        }
    }

    fn solve_linear(&self, mut formulation: Formulation) -> Result<Solution, SolverError> {
        RevisedSimplex::new(&self.config).solve(&mut formulation.scf)?;
        let scf = &formulation.scf;

        let mut solution = match scf.status {
            SolverStatus::Optimal => {
                let mut solution = optimal_solution(&formulation, scf.objective_value, &scf.primal_solution);
                solution.duals = formulation
                    .row_signs
                    .iter()
                    .zip(&scf.duals)
                    .map(|(sign, y)| formulation.objective_sign * sign * y)
                    .collect();
                solution
            }
            SolverStatus::Unbounded => Solution::unbounded(),
            _ => Solution::infeasible(),
        };
        solution.objective_value *= formulation.objective_sign;
        solution.iterations = scf.iterations;
        Ok(solution)
    }

    fn solve_integer(&self, formulation: Formulation) -> Result<Solution, SolverError> {
        let mut ip = IntegerProgram::with_integrality(formulation.scf.clone(), formulation.integrality.clone())?;
        BranchAndBound::new(&self.config).solve(&mut ip)?;

        let mut solution = match ip.status {
            SolverStatus::Optimal => optimal_solution(&formulation, ip.best_objective, &ip.best_solution),
            SolverStatus::Unbounded => Solution::unbounded(),
            _ => Solution::infeasible(),
        };
        solution.objective_value *= formulation.objective_sign;
        solution.nodes_explored = ip.nodes_explored;
        solution.iterations = ip.iterations;
        Ok(solution)
    }
}

/// Map a minimization-form optimum back onto the model's variables and rows.
fn optimal_solution(formulation: &Formulation, objective: f64, x: &[f64]) -> Solution {
    Solution {
        status: SolverStatus::Optimal,
        objective_value: objective,
        values: x[..formulation.num_variables].to_vec(),
        slacks: formulation
            .slack_columns
            .iter()
            .map(|column| column.map(|j| x[j]))
            .collect(),
        duals: Vec::new(),
        nodes_explored: 0,
        iterations: 0,
    }
}
