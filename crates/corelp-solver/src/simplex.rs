use std::fmt;

use tracing::{debug, trace};

use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::linalg::{LuFactorization, Matrix, dot};
use crate::scf::StandardComputationalForm;
use crate::status::SolverStatus;

/// Which half of the two-phase method is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Drive the artificial variables out to find a feasible basis
    One,
    /// Optimize the real objective from that basis
    Two,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::One => write!(f, "phase 1"),
            Phase::Two => write!(f, "phase 2"),
        }
    }
}

/// Two-phase revised simplex solver for one standard computational form.
pub struct RevisedSimplex<'a> {
    config: &'a SolverConfig,
}

impl<'a> RevisedSimplex<'a> {
    pub fn new(config: &'a SolverConfig) -> Self {
        Self { config }
    }

    /// Solve `scf` in place.
    ///
    /// On return `status` is Optimal, Infeasible, or Unbounded. For Optimal
    /// the primal solution (slack columns included), objective value, duals,
    /// and final basis are filled in. Numerical failures come back as errors
    /// and leave `status` as NotSolved.
    pub fn solve(&self, scf: &mut StandardComputationalForm) -> Result<(), SolverError> {
        self.config.validate()?;
        scf.validate()?;
        scf.reset_solution();

        let m = scf.num_rows();
        let n = scf.num_cols();

        if m == 0 {
            self.solve_unconstrained(scf);
            return Ok(());
        }

        let problem = AugmentedProblem::build(scf);

        // Phase 1: minimize the sum of the artificials, starting from them
        let mut phase1_costs = vec![0.0; n];
        phase1_costs.extend(std::iter::repeat_n(1.0, m));
        let initial_basis: Vec<usize> = (n..n + m).collect();
        let phase1 = self.run_phase(&problem, &phase1_costs, n + m, initial_basis, Phase::One)?;
        // The phase 1 objective is bounded below by zero
        if matches!(phase1.outcome, PhaseOutcome::Unbounded) {
            return Err(SolverError::UnboundedPhaseOne {
                iteration: phase1.iterations,
            });
        }

        let artificial_mass: f64 = phase1
            .basis
            .iter()
            .zip(&phase1.xb)
            .map(|(&j, &x)| phase1_costs[j] * x)
            .sum();
        scf.iterations = phase1.iterations;

        if artificial_mass > self.config.feasibility_tolerance {
            if self.config.logging {
                debug!(
                    component = "simplex",
                    operation = "phase1",
                    status = "infeasible",
                    artificial_mass,
                    iterations = phase1.iterations,
                );
            }
            scf.status = SolverStatus::Infeasible;
            scf.objective_value = f64::INFINITY;
            return Ok(());
        }

        if self.config.logging {
            debug!(
                component = "simplex",
                operation = "phase1",
                status = "feasible",
                artificial_mass,
                iterations = phase1.iterations,
            );
        }

        // Phase 2: artificials cost nothing and may no longer enter
        let mut phase2_costs = scf.objective.clone();
        phase2_costs.extend(std::iter::repeat_n(0.0, m));
        let phase2 = self.run_phase(&problem, &phase2_costs, n, phase1.basis, Phase::Two)?;
        scf.iterations += phase2.iterations;

        match phase2.outcome {
            PhaseOutcome::Unbounded => {
                if self.config.logging {
                    debug!(
                        component = "simplex",
                        operation = "phase2",
                        status = "unbounded",
                        iterations = scf.iterations,
                    );
                }
                scf.status = SolverStatus::Unbounded;
                scf.objective_value = f64::NEG_INFINITY;
                scf.basis = phase2.basis;
            }
            PhaseOutcome::Optimal => {
                let mut x = vec![0.0; n];
                for (&j, &value) in phase2.basis.iter().zip(&phase2.xb) {
                    if j < n {
                        x[j] = value;
                    }
                }
                scf.objective_value = dot(&scf.objective, &x);
                scf.primal_solution = x;
                scf.duals = phase2
                    .pi
                    .iter()
                    .zip(&problem.row_signs)
                    .map(|(pi, sign)| pi * sign)
                    .collect();
                scf.basis = phase2.basis;
                scf.status = SolverStatus::Optimal;
                if self.config.logging {
                    debug!(
                        component = "simplex",
                        operation = "phase2",
                        status = "optimal",
                        objective = scf.objective_value,
                        iterations = scf.iterations,
                    );
                }
            }
        }

        Ok(())
    }

    /// No rows: `x = 0` is optimal unless some cost is negative.
    fn solve_unconstrained(&self, scf: &mut StandardComputationalForm) {
        let n = scf.num_cols();
        if scf.objective.iter().any(|&c| c < -self.config.tolerance) {
            scf.status = SolverStatus::Unbounded;
            scf.objective_value = f64::NEG_INFINITY;
        } else {
            scf.status = SolverStatus::Optimal;
            scf.objective_value = 0.0;
            scf.primal_solution = vec![0.0; n];
        }
    }

    /// The pivot loop shared by both phases.
    ///
    /// Only columns below `candidates` may enter the basis.
    fn run_phase(
        &self,
        problem: &AugmentedProblem,
        costs: &[f64],
        candidates: usize,
        mut basis: Vec<usize>,
        phase: Phase,
    ) -> Result<PhaseResult, SolverError> {
        let mut basic_costs: Vec<f64> = basis.iter().map(|&j| costs[j]).collect();
        let mut basis_matrix = problem.a.select_columns(&basis);

        for iteration in 0..self.config.max_iterations {
            if self.config.is_cancelled() {
                return Err(SolverError::Cancelled);
            }

            let lu = LuFactorization::new(&basis_matrix).ok_or(SolverError::SingularBasis { phase, iteration })?;
            let xb = lu.solve(&problem.b);
            let pi = lu.solve_transpose(&basic_costs);
            if self.config.logging {
                trace!(
                    component = "simplex",
                    operation = "iterate",
                    %phase,
                    iteration,
                    xb = ?xb,
                    pi = ?pi,
                );
            }

            let Some((entering, reduced_cost)) = self.find_entering(problem, costs, &pi, &basis, candidates) else {
                return Ok(PhaseResult {
                    outcome: PhaseOutcome::Optimal,
                    basis,
                    xb,
                    pi,
                    iterations: iteration,
                });
            };

            let column = problem.a.column(entering);
            let direction = lu.solve(&column);

            let Some(leaving) = self.find_leaving(&direction, &xb, &basis, phase, problem.n) else {
                if self.config.logging {
                    debug!(
                        component = "simplex",
                        operation = "ratio_test",
                        status = "unbounded",
                        %phase,
                        iteration,
                        entering,
                    );
                }
                return Ok(PhaseResult {
                    outcome: PhaseOutcome::Unbounded,
                    basis,
                    xb,
                    pi,
                    iterations: iteration,
                });
            };

            if self.config.logging {
                debug!(
                    component = "simplex",
                    operation = "pivot",
                    %phase,
                    iteration,
                    entering,
                    leaving = basis[leaving],
                    leaving_row = leaving,
                    reduced_cost,
                    objective = dot(&basic_costs, &xb),
                );
            }

            basis_matrix.set_column(leaving, &column);
            basis[leaving] = entering;
            basic_costs[leaving] = costs[entering];
        }

        Err(SolverError::MaxIterationsExceeded {
            phase,
            iterations: self.config.max_iterations,
        })
    }

    /// Most negative reduced cost among non-basic candidates; first column wins ties.
    fn find_entering(
        &self,
        problem: &AugmentedProblem,
        costs: &[f64],
        pi: &[f64],
        basis: &[usize],
        candidates: usize,
    ) -> Option<(usize, f64)> {
        let mut is_basic = vec![false; costs.len()];
        for &j in basis {
            is_basic[j] = true;
        }

        let mut best: Option<(usize, f64)> = None;
        for j in 0..candidates {
            if is_basic[j] {
                continue;
            }
            let reduced_cost = costs[j] - problem.a.column_dot(j, pi);
            if best.is_none_or(|(_, min)| reduced_cost < min) {
                best = Some((j, reduced_cost));
            }
        }

        best.filter(|&(_, rc)| rc < -self.config.tolerance)
    }

    /// Row that leaves the basis, or `None` if the direction is unbounded.
    fn find_leaving(
        &self,
        direction: &[f64],
        xb: &[f64],
        basis: &[usize],
        phase: Phase,
        original_cols: usize,
    ) -> Option<usize> {
        let pivot_tol = self.config.feasibility_tolerance;

        // A lingering artificial leaves as soon as it can be pivoted out
        if phase == Phase::Two {
            let forced = basis
                .iter()
                .zip(direction)
                .position(|(&j, d)| j >= original_cols && d.abs() > pivot_tol);
            if forced.is_some() {
                return forced;
            }
        }

        let leaving = min_ratio_row(direction, xb, pivot_tol);
        if leaving.is_none() && phase == Phase::One {
            // Any positive entry blocks while artificials are being driven out
            return min_ratio_row(direction, xb, 0.0);
        }
        leaving
    }
}

/// Row minimizing `xb / d` over entries with `d > threshold`; first row wins ties.
fn min_ratio_row(direction: &[f64], xb: &[f64], threshold: f64) -> Option<usize> {
    let mut leaving = None;
    let mut min_ratio = f64::INFINITY;
    for (row, (&d, &x)) in direction.iter().zip(xb).enumerate() {
        if d > threshold {
            let ratio = x / d;
            if ratio < min_ratio {
                min_ratio = ratio;
                leaving = Some(row);
            }
        }
    }
    leaving
}

/// `[A | I]` with every row oriented so that `b ≥ 0`.
struct AugmentedProblem {
    a: Matrix,
    b: Vec<f64>,
    /// −1 where a row was negated to make its right-hand side non-negative
    row_signs: Vec<f64>,
    /// Column count of the original form; artificials start here
    n: usize,
}

impl AugmentedProblem {
    fn build(scf: &StandardComputationalForm) -> Self {
        let m = scf.num_rows();
        let n = scf.num_cols();
        let mut a = scf.constraints.hconcat(&Matrix::identity(m));
        let mut b = scf.rhs.clone();
        let mut row_signs = vec![1.0; m];

        for i in 0..m {
            if b[i] < 0.0 {
                row_signs[i] = -1.0;
                b[i] = -b[i];
                for j in 0..n {
                    a[(i, j)] = -a[(i, j)];
                }
            }
        }

        Self { a, b, row_signs, n }
    }
}

enum PhaseOutcome {
    Optimal,
    Unbounded,
}

struct PhaseResult {
    outcome: PhaseOutcome,
    basis: Vec<usize>,
    xb: Vec<f64>,
    pi: Vec<f64>,
    iterations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    fn solve(rows: Vec<Vec<f64>>, rhs: Vec<f64>, objective: Vec<f64>) -> StandardComputationalForm {
        let mut scf = StandardComputationalForm::from_rows(rows, rhs, objective).unwrap();
        let config = SolverConfig::default();
        RevisedSimplex::new(&config).solve(&mut scf).unwrap();
        scf
    }

    fn assert_vec_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-6, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn test_equality_system_with_unique_point() {
        // 2x + y = 4, x + 2y = 4 pins x = y = 4/3
        let scf = solve(vec![vec![2.0, 1.0], vec![1.0, 2.0]], vec![4.0, 4.0], vec![1.0, 1.0]);
        assert_eq!(scf.status, SolverStatus::Optimal);
        assert_vec_close(&scf.primal_solution, &[4.0 / 3.0, 4.0 / 3.0]);
        assert!((scf.objective_value - 8.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_rhs_infeasible() {
        let scf = solve(
            vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![-1.0, 1.0, 1.0],
            vec![1.0, 1.0],
        );
        assert_eq!(scf.status, SolverStatus::Infeasible);
        assert!(scf.primal_solution.is_empty());
    }

    #[test]
    fn test_two_phase_optimal_basis() {
        let scf = solve(
            vec![
                vec![1.0, -1.0, 1.0, 1.0, 0.0, 0.0],
                vec![1.0, 1.0, 0.0, 0.0, -1.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            ],
            vec![4.0, 0.0, 6.0],
            vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0],
        );
        assert_eq!(scf.status, SolverStatus::Optimal);
        assert!(scf.objective_value.abs() < 1e-9);
        assert_vec_close(&scf.primal_solution, &[0.0, 0.0, 0.0, 4.0, 0.0, 6.0]);
        assert_eq!(scf.basis, vec![3, 5, 4]);
    }

    #[test]
    fn test_unbounded() {
        let scf = solve(
            vec![
                vec![0.08, 0.06, -1.0, 0.0, 0.0],
                vec![1.0, 0.0, 0.0, -1.0, 0.0],
                vec![0.0, 1.0, 0.0, 0.0, -1.0],
            ],
            vec![12.0, 60.0, 60.0],
            vec![-2.0, -1.25, 0.0, 0.0, 0.0],
        );
        assert_eq!(scf.status, SolverStatus::Unbounded);
        assert_eq!(scf.objective_value, f64::NEG_INFINITY);
    }

    #[test]
    fn test_medium_problem() {
        let scf = solve(
            vec![
                vec![1.0, 1.0, 1.0, 1.0, 0.0],
                vec![0.0, -1.0, 0.0, -1.0, 1.0],
                vec![1.0, 0.0, 1.0, 0.0, 1.0],
            ],
            vec![4.0, 4.0, 8.0],
            vec![15.0, 10.0, -10.0, 1.0, 2.0],
        );
        assert_eq!(scf.status, SolverStatus::Optimal);
        assert!((scf.objective_value + 32.0).abs() < 1e-9);
        assert_vec_close(&scf.primal_solution, &[0.0, 0.0, 4.0, 0.0, 4.0]);
        assert_eq!(scf.basis, vec![2, 4, 7]);
        assert_vec_close(&scf.duals, &[-10.0, 2.0, 0.0]);
    }

    #[test]
    fn test_already_optimal() {
        let scf = solve(
            vec![
                vec![1.0, 0.0, 0.0, 1.0],
                vec![0.0, 1.0, 0.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0],
            ],
            vec![3.0, 2.0, 1.0],
            vec![0.0, 0.0, 0.0, 1.0],
        );
        assert_eq!(scf.status, SolverStatus::Optimal);
        assert_vec_close(&scf.primal_solution, &[3.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_all_zeros() {
        let scf = solve(vec![vec![0.0; 4], vec![0.0; 4]], vec![0.0, 0.0], vec![0.0; 4]);
        assert_eq!(scf.status, SolverStatus::Optimal);
        assert_vec_close(&scf.primal_solution, &[0.0; 4]);
        assert_eq!(scf.basis, vec![4, 5]);
    }

    #[test]
    fn test_duplicate_row_infeasible() {
        let scf = solve(vec![vec![1.0, 0.0], vec![1.0, 0.0]], vec![1.0, -2.0], vec![1.0, 1.0]);
        assert_eq!(scf.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_no_rows() {
        let scf = solve(Vec::new(), Vec::new(), vec![1.0, 0.0]);
        assert_eq!(scf.status, SolverStatus::Optimal);
        assert_eq!(scf.primal_solution, vec![0.0, 0.0]);

        let scf = solve(Vec::new(), Vec::new(), vec![1.0, -1.0]);
        assert_eq!(scf.status, SolverStatus::Unbounded);
    }

    #[test]
    fn test_reduced_costs_certify_optimality() {
        let scf = solve(
            vec![
                vec![1.0, 1.0, 1.0, 1.0, 0.0],
                vec![0.0, -1.0, 0.0, -1.0, 1.0],
                vec![1.0, 0.0, 1.0, 0.0, 1.0],
            ],
            vec![4.0, 4.0, 8.0],
            vec![15.0, 10.0, -10.0, 1.0, 2.0],
        );
        for j in 0..scf.num_cols() {
            if scf.basis.contains(&j) {
                continue;
            }
            let rc = scf.objective[j] - scf.constraints.column_dot(j, &scf.duals);
            assert!(rc >= -1e-6, "column {j} has reduced cost {rc}");
        }
    }

    #[test]
    fn test_iteration_cap() {
        let mut scf = StandardComputationalForm::from_rows(
            vec![
                vec![1.0, -1.0, 1.0, 1.0, 0.0, 0.0],
                vec![1.0, 1.0, 0.0, 0.0, -1.0, 0.0],
                vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            ],
            vec![4.0, 0.0, 6.0],
            vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0],
        )
        .unwrap();
        let config = SolverConfig::new().with_max_iterations(1);
        let err = RevisedSimplex::new(&config).solve(&mut scf).unwrap_err();
        assert_eq!(
            err,
            SolverError::MaxIterationsExceeded {
                phase: Phase::One,
                iterations: 1
            }
        );
        assert_eq!(scf.status, SolverStatus::NotSolved);
    }

    #[test]
    fn test_tiny_pivots_still_reach_feasibility() {
        // Every entry of the direction sits below the feasibility tolerance
        let rows = vec![vec![0.9e-8]; 120];
        let scf = solve(rows, vec![0.9e-8; 120], vec![1.0]);
        assert_eq!(scf.status, SolverStatus::Optimal);
        assert_vec_close(&scf.primal_solution, &[1.0]);
        assert!((scf.objective_value - 1.0).abs() < 1e-6);
        assert_eq!(scf.iterations, 1);
    }

    #[test]
    fn test_phase_one_ratio_falls_back_to_positive_entries() {
        let config = SolverConfig::default();
        let simplex = RevisedSimplex::new(&config);
        let direction = [0.5e-8, 0.2e-8, -1.0];
        let xb = [1.0, 0.2, 3.0];
        assert_eq!(simplex.find_leaving(&direction, &xb, &[0, 1, 2], Phase::One, 3), Some(1));
        assert_eq!(simplex.find_leaving(&direction, &xb, &[0, 1, 2], Phase::Two, 3), None);
    }

    #[test]
    fn test_singular_starting_basis() {
        let scf = StandardComputationalForm::from_rows(
            vec![vec![1.0, 1.0], vec![1.0, -1.0]],
            vec![2.0, 0.0],
            vec![1.0, 1.0],
        )
        .unwrap();
        // Both basis slots name the first artificial
        let problem = AugmentedProblem::build(&scf);
        let costs = vec![0.0, 0.0, 1.0, 1.0];
        let config = SolverConfig::default();
        let result = RevisedSimplex::new(&config).run_phase(&problem, &costs, 4, vec![2, 2], Phase::One);
        assert_eq!(
            result.err(),
            Some(SolverError::SingularBasis {
                phase: Phase::One,
                iteration: 0
            })
        );
        assert_eq!(scf.status, SolverStatus::NotSolved);
    }

    #[test]
    fn test_cancelled_before_first_pivot() {
        let mut scf = StandardComputationalForm::from_rows(vec![vec![1.0]], vec![1.0], vec![1.0]).unwrap();
        let config = SolverConfig::new().with_cancel_token(Arc::new(AtomicBool::new(true)));
        let err = RevisedSimplex::new(&config).solve(&mut scf).unwrap_err();
        assert_eq!(err, SolverError::Cancelled);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        let mut scf = StandardComputationalForm::from_rows(vec![vec![1.0, 2.0]], vec![1.0], vec![1.0, 1.0]).unwrap();
        scf.rhs.push(3.0);
        let config = SolverConfig::default();
        let err = RevisedSimplex::new(&config).solve(&mut scf).unwrap_err();
        assert!(matches!(err, SolverError::InvalidDimensions(_)));
    }

    #[test]
    fn test_solving_twice_is_identical() {
        let rows = vec![vec![1.0, 2.0, 1.0, 0.0], vec![3.0, 1.0, 0.0, 1.0]];
        let first = solve(rows.clone(), vec![8.0, 9.0], vec![-1.0, -1.0, 0.0, 0.0]);
        let second = solve(rows, vec![8.0, 9.0], vec![-1.0, -1.0, 0.0, 0.0]);
        assert_eq!(first, second);
        assert_eq!(first.status, SolverStatus::Optimal);
    }
}
