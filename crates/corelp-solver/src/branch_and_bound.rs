//! Depth-first branch-and-bound over LP relaxations.
//!
//! Every node owns its own copy of the form. A child is its parent plus one
//! `≤` row (with a fresh slack column) bounding the branching column, so the
//! equality-form simplex enforces it as an inequality. The tree only lives on
//! the call stack of [`BranchAndBound::solve`].

use tracing::debug;

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::linalg::dot;
use crate::scf::StandardComputationalForm;
use crate::simplex::RevisedSimplex;
use crate::status::SolverStatus;
use crate::strategy::FractionalColumn;

/// An SCF whose columns may be required to take integer values.
#[derive(Debug, Clone)]
pub struct IntegerProgram {
    /// The root form; never modified by a solve
    pub scf: StandardComputationalForm,
    /// Per root column: must it be integral. Slack columns are never checked.
    pub integrality: Vec<bool>,
    /// Objective of the incumbent in minimization form; `INFINITY` if none
    pub best_objective: f64,
    /// Incumbent over the root columns; empty if none
    pub best_solution: Vec<f64>,
    pub status: SolverStatus,
    /// Objective of the root relaxation, a lower bound on `best_objective`
    pub root_bound: f64,
    pub nodes_explored: usize,
    /// Simplex pivots summed over every relaxation solved
    pub iterations: usize,
}

impl IntegerProgram {
    /// Every non-slack column is integer.
    pub fn new(scf: StandardComputationalForm) -> Self {
        let integrality = scf.slack_indices.iter().map(|s| s.is_none()).collect();
        Self::unsolved(scf, integrality)
    }

    /// Explicit per-column integrality, one flag per column of `scf`.
    pub fn with_integrality(scf: StandardComputationalForm, integrality: Vec<bool>) -> Result<Self, SolverError> {
        if integrality.len() != scf.num_cols() {
            return Err(SolverError::InvalidDimensions(format!(
                "form has {} columns but {} integrality flags were given",
                scf.num_cols(),
                integrality.len()
            )));
        }
        Ok(Self::unsolved(scf, integrality))
    }

    fn unsolved(scf: StandardComputationalForm, integrality: Vec<bool>) -> Self {
        Self {
            scf,
            integrality,
            best_objective: f64::INFINITY,
            best_solution: Vec::new(),
            status: SolverStatus::NotSolved,
            root_bound: f64::NEG_INFINITY,
            nodes_explored: 0,
            iterations: 0,
        }
    }

    fn reset_search(&mut self) {
        self.best_objective = f64::INFINITY;
        self.best_solution.clear();
        self.status = SolverStatus::NotSolved;
        self.root_bound = f64::NEG_INFINITY;
        self.nodes_explored = 0;
        self.iterations = 0;
    }
}

/// Which side of a fractional value a child restricts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDirection {
    /// `x ≤ floor(value)`
    Down,
    /// `x ≥ ceil(value)`
    Up,
}

/// The bound that created a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchDecision {
    pub column: usize,
    pub direction: BranchDirection,
    pub bound: f64,
}

/// One node of the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// Private copy of the parent's form plus this node's branch row
    pub scf: StandardComputationalForm,
    pub depth: usize,
    /// The solved relaxation is optimal with every integer column integral
    pub is_integer: bool,
    /// `None` for the root
    pub branch: Option<BranchDecision>,
}

impl Node {
    fn root(scf: StandardComputationalForm) -> Self {
        Self {
            scf,
            depth: 0,
            is_integer: false,
            branch: None,
        }
    }

    fn child(&self, column: usize, direction: BranchDirection, bound: f64) -> Result<Self, SolverError> {
        let mut scf = self.scf.clone();
        scf.reset_solution();
        let mut coefficients = vec![0.0; column + 1];
        match direction {
            BranchDirection::Down => {
                coefficients[column] = 1.0;
                scf.push_le_row(&coefficients, bound)?;
            }
            BranchDirection::Up => {
                coefficients[column] = -1.0;
                scf.push_le_row(&coefficients, -bound)?;
            }
        }
        Ok(Self {
            scf,
            depth: self.depth + 1,
            is_integer: false,
            branch: Some(BranchDecision {
                column,
                direction,
                bound,
            }),
        })
    }
}

/// Branch-and-bound driver.
pub struct BranchAndBound<'a> {
    config: &'a SolverConfig,
}

impl<'a> BranchAndBound<'a> {
    pub fn new(config: &'a SolverConfig) -> Self {
        Self { config }
    }

    /// Search for the best integer point of `ip`.
    ///
    /// On `Ok`, `ip.status` is Optimal (incumbent in `best_objective` and
    /// `best_solution`), Infeasible, or Unbounded. A tripped depth or node
    /// guard returns `SearchIncomplete`; the incumbent found so far, if any,
    /// is still stored in `ip`.
    pub fn solve(&self, ip: &mut IntegerProgram) -> Result<(), SolverError> {
        self.config.validate()?;
        ip.scf.validate()?;
        if ip.integrality.len() != ip.scf.num_cols() {
            return Err(SolverError::InvalidDimensions(format!(
                "form has {} columns but {} integrality flags were given",
                ip.scf.num_cols(),
                ip.integrality.len()
            )));
        }
        ip.reset_search();

        let mut search = Search {
            config: self.config,
            simplex: RevisedSimplex::new(self.config),
            integrality: &ip.integrality,
            root_columns: ip.scf.num_cols(),
            incumbent: None,
            nodes: 0,
            iterations: 0,
        };

        let outcome = search.run(Node::root(ip.scf.clone()));

        ip.nodes_explored = search.nodes;
        ip.iterations = search.iterations;
        if let Some((objective, solution)) = search.incumbent.take() {
            ip.best_objective = objective;
            ip.best_solution = solution;
        }

        let (root_status, root_bound) = outcome?;
        ip.root_bound = root_bound;
        ip.status = match root_status {
            SolverStatus::Unbounded => SolverStatus::Unbounded,
            _ if ip.best_solution.is_empty() => SolverStatus::Infeasible,
            _ => SolverStatus::Optimal,
        };

        if self.config.logging {
            debug!(
                component = "branch_and_bound",
                operation = "solve",
                status = ip.status.as_str(),
                objective = ip.best_objective,
                nodes = ip.nodes_explored,
            );
        }
        Ok(())
    }
}

/// State shared across one search.
struct Search<'s> {
    config: &'s SolverConfig,
    simplex: RevisedSimplex<'s>,
    integrality: &'s [bool],
    root_columns: usize,
    incumbent: Option<(f64, Vec<f64>)>,
    nodes: usize,
    iterations: usize,
}

impl Search<'_> {
    /// Solve the root and everything under it; returns the root relaxation's status and objective.
    fn run(&mut self, mut root: Node) -> Result<(SolverStatus, f64), SolverError> {
        self.relax(&mut root)?;
        let relaxation = (root.scf.status, root.scf.objective_value);
        self.explore(root)?;
        Ok(relaxation)
    }

    fn simplex_solve(&mut self, scf: &mut StandardComputationalForm) -> Result<(), SolverError> {
        let result = self.simplex.solve(scf);
        self.iterations += scf.iterations;
        result
    }

    /// Solve a node's relaxation, then apply any cuts and re-solve once.
    ///
    /// `is_integer` is current whenever a hook sees the node.
    fn relax(&mut self, node: &mut Node) -> Result<(), SolverError> {
        self.simplex_solve(&mut node.scf)?;
        node.is_integer = self.is_integral(&node.scf);
        if node.scf.status != SolverStatus::Optimal {
            return Ok(());
        }

        let cuts = self.config.strategies.cuts.generate(node);
        if cuts.is_empty() {
            return Ok(());
        }
        for cut in &cuts {
            node.scf.push_le_row(&cut.coefficients, cut.rhs)?;
        }
        if self.config.logging {
            debug!(
                component = "branch_and_bound",
                operation = "cuts",
                depth = node.depth,
                count = cuts.len(),
            );
        }
        self.simplex_solve(&mut node.scf)?;
        node.is_integer = self.is_integral(&node.scf);
        Ok(())
    }

    fn is_integral(&self, scf: &StandardComputationalForm) -> bool {
        scf.status == SolverStatus::Optimal && self.fractional_columns(scf).is_empty()
    }

    /// Explore the subtree under a node whose relaxation is already solved.
    fn explore(&mut self, node: Node) -> Result<(), SolverError> {
        if self.config.is_cancelled() {
            return Err(SolverError::Cancelled);
        }
        if self.nodes >= self.config.max_nodes {
            return Err(self.incomplete(node.depth));
        }
        self.nodes += 1;

        if node.scf.status != SolverStatus::Optimal {
            self.log_node(&node, "pruned_relaxation");
            return Ok(());
        }
        if self.is_dominated(node.scf.objective_value) {
            self.log_node(&node, "pruned_bound");
            return Ok(());
        }

        if let Some(candidate) = self.config.strategies.heuristic.propose(&node) {
            self.offer_heuristic(&node, candidate);
            if self.is_dominated(node.scf.objective_value) {
                self.log_node(&node, "pruned_bound");
                return Ok(());
            }
        }

        if node.is_integer {
            let objective = node.scf.objective_value;
            let status = if self.offer(objective, &node.scf.primal_solution) {
                "incumbent"
            } else {
                "integer"
            };
            self.log_node(&node, status);
            return Ok(());
        }

        let fractional = self.fractional_columns(&node.scf);
        let column = self
            .config
            .strategies
            .branching
            .select(&fractional)
            .filter(|c| fractional.iter().any(|f| f.column == *c))
            .ok_or_else(|| {
                SolverError::InvalidConfig("branching strategy did not select a fractional column".to_string())
            })?;

        if node.depth >= self.config.max_depth {
            return Err(self.incomplete(node.depth));
        }

        let value = node.scf.primal_solution[column];
        if self.config.logging {
            debug!(
                component = "branch_and_bound",
                operation = "branch",
                depth = node.depth,
                column,
                value,
                bound = node.scf.objective_value,
                incumbent = self.incumbent_objective(),
            );
        }

        let mut left = node.child(column, BranchDirection::Down, value.floor())?;
        let mut right = node.child(column, BranchDirection::Up, value.ceil())?;
        drop(node);

        self.relax(&mut left)?;
        self.explore(left)?;
        self.relax(&mut right)?;
        self.explore(right)
    }

    /// Integer columns (slacks excluded) whose value is off an integer.
    fn fractional_columns(&self, scf: &StandardComputationalForm) -> Vec<FractionalColumn> {
        scf.primal_solution
            .iter()
            .enumerate()
            .filter(|&(j, _)| self.is_integer_column(scf, j))
            .filter(|&(_, &value)| (value - value.round()).abs() > self.config.integrality_tolerance)
            .map(|(column, &value)| FractionalColumn { column, value })
            .collect()
    }

    fn is_integer_column(&self, scf: &StandardComputationalForm, column: usize) -> bool {
        self.integrality.get(column).copied().unwrap_or(false) && !scf.is_slack(column)
    }

    /// Can a node with relaxation objective `bound` still beat the incumbent?
    fn is_dominated(&self, bound: f64) -> bool {
        match &self.incumbent {
            Some((best, _)) => {
                best - bound <= self.config.gap_sensitivity * best.abs() + self.config.improvement_tolerance
            }
            None => false,
        }
    }

    /// Record a verified integer point if it strictly improves the incumbent.
    fn offer(&mut self, objective: f64, solution: &[f64]) -> bool {
        let improves = match &self.incumbent {
            Some((best, _)) => objective < best - self.config.improvement_tolerance,
            None => true,
        };
        if improves {
            let kept = solution.len().min(self.root_columns);
            self.incumbent = Some((objective, solution[..kept].to_vec()));
        }
        improves
    }

    /// Accept a heuristic point only if it is feasible and integral for this node.
    fn offer_heuristic(&mut self, node: &Node, candidate: Vec<f64>) {
        let scf = &node.scf;
        let tol = self.config.tolerance;
        let valid = candidate.len() == scf.num_cols()
            && candidate.iter().all(|&v| v.is_finite() && v >= -tol)
            && scf.residual(&candidate) <= tol
            && self.fractional_columns_of(scf, &candidate).is_empty();
        if !valid {
            if self.config.logging {
                debug!(
                    component = "branch_and_bound",
                    operation = "heuristic",
                    status = "rejected",
                    depth = node.depth,
                );
            }
            return;
        }
        let objective = dot(&scf.objective, &candidate);
        let accepted = self.offer(objective, &candidate);
        if self.config.logging {
            let status = if accepted { "accepted" } else { "not_improving" };
            debug!(
                component = "branch_and_bound",
                operation = "heuristic",
                status,
                depth = node.depth,
                objective,
            );
        }
    }

    fn fractional_columns_of(&self, scf: &StandardComputationalForm, x: &[f64]) -> Vec<usize> {
        (0..x.len())
            .filter(|&j| self.is_integer_column(scf, j))
            .filter(|&j| (x[j] - x[j].round()).abs() > self.config.integrality_tolerance)
            .collect()
    }

    fn incumbent_objective(&self) -> Option<f64> {
        self.incumbent.as_ref().map(|(objective, _)| *objective)
    }

    fn incomplete(&self, depth: usize) -> SolverError {
        if self.config.logging {
            debug!(
                component = "branch_and_bound",
                operation = "guard",
                status = "incomplete",
                depth,
                nodes = self.nodes,
            );
        }
        SolverError::SearchIncomplete {
            nodes: self.nodes,
            depth,
            incumbent: self.incumbent_objective(),
        }
    }

    fn log_node(&self, node: &Node, status: &str) {
        if self.config.logging {
            debug!(
                component = "branch_and_bound",
                operation = "node",
                status,
                depth = node.depth,
                relaxation = node.scf.status.as_str(),
                bound = node.scf.objective_value,
                incumbent = self.incumbent_objective(),
            );
        }
    }
}
