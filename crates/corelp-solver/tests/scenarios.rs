use corelp_solver::{
    BranchAndBound, ConstraintOp, IntegerProgram, Model, RevisedSimplex, Sense, Solver, SolverConfig, SolverStatus,
    StandardComputationalForm, VariableCategory,
};

const EPS: f64 = 1e-6;

fn solve_lp(rows: Vec<Vec<f64>>, rhs: Vec<f64>, objective: Vec<f64>) -> StandardComputationalForm {
    let mut scf = StandardComputationalForm::from_rows(rows, rhs, objective).unwrap();
    let config = SolverConfig::default();
    RevisedSimplex::new(&config).solve(&mut scf).unwrap();
    scf
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (j, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!((a - e).abs() < EPS, "x[{}] = {} expected {}", j, a, e);
    }
}

fn integer_two_var_model() -> Model {
    let mut model = Model::new("integer_branch");
    model.add_variable("x1", VariableCategory::Integer);
    model.add_variable("x2", VariableCategory::Integer);
    model.set_objective(Sense::Maximize, vec![1.0, 1.0]);
    model
        .add_term_constraint("first", &[("x1", 1.0), ("x2", 2.0)], ConstraintOp::Le, 4.0)
        .unwrap();
    model
        .add_term_constraint("second", &[("x1", 2.0), ("x2", 1.0)], ConstraintOp::Le, 4.0)
        .unwrap();
    model
}

#[test]
fn test_unique_point_as_equalities() {
    // 2x1 + x2 = 4, x1 + 2x2 = 4 pins x to (4/3, 4/3)
    let scf = solve_lp(vec![vec![2.0, 1.0], vec![1.0, 2.0]], vec![4.0, 4.0], vec![1.0, 1.0]);
    assert_eq!(scf.status, SolverStatus::Optimal);
    assert!((scf.objective_value - 8.0 / 3.0).abs() < EPS);
    assert_close(&scf.primal_solution, &[4.0 / 3.0, 4.0 / 3.0]);
}

#[test]
fn test_unique_point_as_integer_program() {
    // The same rows as ≤ constraints with integer variables reach z = 2 at (1, 1)
    let scf = StandardComputationalForm::from_le_rows(
        vec![vec![2.0, 1.0], vec![1.0, 2.0]],
        vec![4.0, 4.0],
        vec![-1.0, -1.0],
    )
    .unwrap();
    let config = SolverConfig::default();
    let mut ip = IntegerProgram::new(scf);
    BranchAndBound::new(&config).solve(&mut ip).unwrap();

    assert_eq!(ip.status, SolverStatus::Optimal);
    assert!((-ip.best_objective - 2.0).abs() < EPS);
    assert_close(&ip.best_solution[..2], &[1.0, 1.0]);
}

#[test]
fn test_negative_rhs_infeasible() {
    let scf = solve_lp(
        vec![vec![1.0, 1.0], vec![1.0, 0.0], vec![0.0, 1.0]],
        vec![-1.0, 1.0, 1.0],
        vec![1.0, 1.0],
    );
    assert_eq!(scf.status, SolverStatus::Infeasible);
}

#[test]
fn test_two_phase() {
    let scf = solve_lp(
        vec![
            vec![1.0, -1.0, 1.0, 1.0, 0.0, 0.0],
            vec![1.0, 1.0, 0.0, 0.0, -1.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        ],
        vec![4.0, 0.0, 6.0],
        vec![1.0, 2.0, 3.0, 0.0, 0.0, 0.0],
    );
    assert_eq!(scf.status, SolverStatus::Optimal);
    assert!(scf.objective_value.abs() < EPS);
    assert_close(&scf.primal_solution, &[0.0, 0.0, 0.0, 4.0, 0.0, 6.0]);
}

#[test]
fn test_unboundedness() {
    let scf = solve_lp(
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
fn test_integer_branch() {
    let solution = Solver::default().solve(&integer_two_var_model()).unwrap();

    println!("Values: {:?}", solution.values);
    println!("Objective: {}", solution.objective_value);

    assert_eq!(solution.status, SolverStatus::Optimal);
    assert!((solution.objective_value - 2.0).abs() < EPS);
    for v in &solution.values {
        assert!((v - v.round()).abs() < 1e-5);
    }
    assert!((solution.values[0] + solution.values[1] - 2.0).abs() < EPS);
}

#[test]
fn test_integer_branch_exact_search() {
    let solver = Solver::new(SolverConfig::default().with_gap_sensitivity(0.0));
    let solution = solver.solve(&integer_two_var_model()).unwrap();
    assert!((solution.objective_value - 2.0).abs() < EPS);
}

#[test]
fn test_already_optimal() {
    let scf = solve_lp(
        vec![
            vec![1.0, 0.0, 0.0, 1.0],
            vec![0.0, 1.0, 0.0, 0.0],
            vec![0.0, 0.0, 1.0, 0.0],
        ],
        vec![3.0, 2.0, 1.0],
        vec![0.0, 0.0, 0.0, 1.0],
    );
    assert_eq!(scf.status, SolverStatus::Optimal);
    assert!(scf.objective_value.abs() < EPS);
    assert_close(&scf.primal_solution, &[3.0, 2.0, 1.0, 0.0]);
}

#[test]
fn test_medium_problem() {
    let scf = solve_lp(
        vec![
            vec![1.0, 1.0, 1.0, 1.0, 0.0],
            vec![0.0, -1.0, 0.0, -1.0, 1.0],
            vec![1.0, 0.0, 1.0, 0.0, 1.0],
        ],
        vec![4.0, 4.0, 8.0],
        vec![15.0, 10.0, -10.0, 1.0, 2.0],
    );
    assert_eq!(scf.status, SolverStatus::Optimal);
    assert!((scf.objective_value + 32.0).abs() < EPS);
    assert_close(&scf.primal_solution, &[0.0, 0.0, 4.0, 0.0, 4.0]);
}

#[test]
fn test_all_zeros() {
    let scf = solve_lp(vec![vec![0.0; 4], vec![0.0; 4]], vec![0.0, 0.0], vec![0.0; 4]);
    assert_eq!(scf.status, SolverStatus::Optimal);
    assert_eq!(scf.objective_value, 0.0);
    assert_close(&scf.primal_solution, &[0.0; 4]);
}

#[test]
fn test_duplicate_row_infeasible() {
    let scf = solve_lp(vec![vec![1.0, 0.0], vec![1.0, 0.0]], vec![1.0, -2.0], vec![1.0, 1.0]);
    assert_eq!(scf.status, SolverStatus::Infeasible);
}

#[test]
fn test_big_problem() {
    let mut rows = vec![
        vec![1.0, 2.0, -1.0, 1.0, 1.0, 3.0, -7.0, 1.0, 1.0, -1.0],
        vec![-1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
        vec![2.0, -1.0, 1.0, -1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, -1.0, 1.0, 1.0, -1.0],
        vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, -1.0, 1.0, 1.0, 1.0,
        ],
        vec![
            -1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0,
        ],
        vec![
            0.0, 0.0, 1.0, 1.0, 1.0, 1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, -1.0, 1.0,
        ],
        vec![
            1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0,
        ],
        vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -1.0, 1.0, 1.0, 1.0, -1.0, 1.0, 1.0,
            1.0, 1.0, -1.0,
        ],
        vec![
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, -1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, -1.0, 1.0,
        ],
        vec![
            1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, -1.0,
        ],
        vec![2.0; 35],
    ];
    for row in &mut rows {
        row.resize(35, 0.0);
    }
    let rhs = vec![50.0, 45.0, 60.0, 70.0, 40.0, 55.0, 65.0, 50.0, 75.0, 60.0, 500.0];
    let objective = vec![
        3.0, 5.0, -2.0, 7.0, -1.0, 4.0, 6.0, 8.0, 9.0, 2.0, 1.0, 2.0, 0.0, -4.0, 5.0, 3.0, -6.0, 2.0, -1.0, 4.0, 5.0,
        -2.0, 1.0, 3.0, -1.0, 2.0, 1.0, 3.0, -5.0, 1.0, 4.0, 6.0, -3.0, 2.0, 1.0,
    ];

    let scf = solve_lp(rows, rhs, objective);
    assert_eq!(scf.status, SolverStatus::Optimal);
    assert!((scf.objective_value + 130.5).abs() < EPS);

    let mut expected = vec![0.0; 35];
    for (j, v) in [
        (0, 2.5),
        (4, 8.0),
        (7, 39.5),
        (10, 13.0),
        (13, 26.0),
        (16, 15.5),
        (18, 46.0),
        (21, 14.5),
        (26, 28.0),
        (28, 47.0),
        (33, 10.0),
    ] {
        expected[j] = v;
    }
    assert_close(&scf.primal_solution, &expected);
    assert!(scf.residual(&scf.primal_solution) < EPS);
}

#[test]
fn test_integer_already_integral() {
    let mut model = Model::new("integral");
    model.add_variable("x1", VariableCategory::Integer);
    model.add_variable("x2", VariableCategory::Integer);
    model.set_objective(Sense::Maximize, vec![1.0, 1.0]);
    model.add_constraint("x1_cap", vec![1.0, 0.0], ConstraintOp::Le, 2.0);
    model.add_constraint("x2_cap", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

    let solution = Solver::default().solve(&model).unwrap();
    assert_eq!(solution.status, SolverStatus::Optimal);
    assert!((solution.objective_value - 5.0).abs() < EPS);
    assert_close(&solution.values, &[2.0, 3.0]);
    assert_eq!(solution.nodes_explored, 1);
}

#[test]
fn test_negative_rhs_infeasible_as_inequalities() {
    let mut model = Model::new("negative");
    model.add_variable("x1", VariableCategory::Continuous);
    model.add_variable("x2", VariableCategory::Continuous);
    model.set_objective(Sense::Minimize, vec![1.0, 1.0]);
    model.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, -1.0);
    model.add_constraint("x1", vec![1.0, 0.0], ConstraintOp::Le, 1.0);
    model.add_constraint("x2", vec![0.0, 1.0], ConstraintOp::Le, 1.0);

    let solution = Solver::default().solve(&model).unwrap();
    assert_eq!(solution.status, SolverStatus::Infeasible);
}

#[test]
fn test_diet_style_model() {
    // Minimize cost of two feeds meeting protein and energy floors
    let mut model = Model::new("feed");
    model.add_variable("corn", VariableCategory::Continuous);
    model.add_variable("soy", VariableCategory::Continuous);
    model.set_objective(Sense::Minimize, vec![0.15, 0.40]);
    model
        .add_term_constraint("batch", &[("corn", 1.0), ("soy", 1.0)], ConstraintOp::Eq, 100.0)
        .unwrap();
    model
        .add_term_constraint("protein", &[("corn", 0.08), ("soy", 0.44)], ConstraintOp::Ge, 20.0)
        .unwrap();

    let solution = Solver::default().solve(&model).unwrap();
    assert_eq!(solution.status, SolverStatus::Optimal);

    // corn + soy = 100 and 0.08 corn + 0.44 soy = 20 → soy = 100/3
    let soy = 100.0 / 3.0;
    assert_close(&solution.values, &[100.0 - soy, soy]);
    assert!((solution.objective_value - (0.15 * (100.0 - soy) + 0.40 * soy)).abs() < EPS);
    assert_eq!(solution.slacks[0], None);
    assert!(solution.slacks[1].unwrap().abs() < EPS);
    // Raising the protein floor by one costs (0.40 - 0.15) / 0.36 more
    assert!((solution.duals[1] - 0.25 / 0.36).abs() < EPS);
}
