use crate::error::SolverError;
use crate::linalg::Matrix;
use crate::status::SolverStatus;

/// Standard computational form: minimize `c·x` subject to `A·x = b`, `x ≥ 0`.
///
/// This is the unit of work for the simplex engine. Rows and columns only
/// ever grow: slack columns are appended after the primal columns, and
/// branch-and-bound appends rows (each with its own slack column).
#[derive(Debug, Clone, PartialEq)]
pub struct StandardComputationalForm {
    /// Cost vector `c`, length n, always minimized
    pub objective: Vec<f64>,
    /// Constraint matrix `A`, m × n
    pub constraints: Matrix,
    /// Right-hand side `b`, length m
    pub rhs: Vec<f64>,
    /// `x*`, length n (slack columns included); meaningful when Optimal
    pub primal_solution: Vec<f64>,
    /// `c·x*`; meaningful when Optimal
    pub objective_value: f64,
    pub status: SolverStatus,
    /// Per column: `None` for a primal variable, `Some(row)` for the slack of `row`
    pub slack_indices: Vec<Option<usize>>,
    /// Final simplex multipliers, one per row
    pub duals: Vec<f64>,
    /// Final basic column indices, one per row
    pub basis: Vec<usize>,
    /// Pivots performed across both phases of the last solve
    pub iterations: usize,
}

impl StandardComputationalForm {
    /// Build an SCF whose columns are all primal variables.
    pub fn new(constraints: Matrix, rhs: Vec<f64>, objective: Vec<f64>) -> Result<Self, SolverError> {
        let n = objective.len();
        Self::with_slack_indices(constraints, rhs, objective, vec![None; n])
    }

    /// Build an SCF with explicit slack metadata.
    pub fn with_slack_indices(
        constraints: Matrix,
        rhs: Vec<f64>,
        objective: Vec<f64>,
        slack_indices: Vec<Option<usize>>,
    ) -> Result<Self, SolverError> {
        let scf = Self {
            objective,
            constraints,
            rhs,
            primal_solution: Vec::new(),
            objective_value: 0.0,
            status: SolverStatus::NotSolved,
            slack_indices,
            duals: Vec::new(),
            basis: Vec::new(),
            iterations: 0,
        };
        scf.validate()?;
        Ok(scf)
    }

    /// Convenience constructor from nested rows.
    pub fn from_rows(rows: Vec<Vec<f64>>, rhs: Vec<f64>, objective: Vec<f64>) -> Result<Self, SolverError> {
        let n = objective.len();
        let m = rows.len();
        let constraints = if m == 0 {
            Matrix::zeros(0, n)
        } else {
            Matrix::from_rows(rows)
                .ok_or_else(|| SolverError::InvalidDimensions("constraint rows have differing lengths".to_string()))?
        };
        Self::new(constraints, rhs, objective)
    }

    /// Build `min c·x` subject to `rows·x ≤ rhs`, appending one slack column per row.
    pub fn from_le_rows(rows: Vec<Vec<f64>>, rhs: Vec<f64>, objective: Vec<f64>) -> Result<Self, SolverError> {
        let mut scf = Self::from_rows(rows, rhs, objective)?;
        for row in 0..scf.num_rows() {
            scf.add_slack_column(row, 1.0);
        }
        Ok(scf)
    }

    /// Check `A` is m×n, `b` has m entries, `c` and the slack map have n.
    pub fn validate(&self) -> Result<(), SolverError> {
        let (m, n) = (self.constraints.rows(), self.constraints.cols());
        if self.rhs.len() != m {
            return Err(SolverError::InvalidDimensions(format!(
                "A has {} rows but b has {} entries",
                m,
                self.rhs.len()
            )));
        }
        if self.objective.len() != n {
            return Err(SolverError::InvalidDimensions(format!(
                "A has {} columns but c has {} entries",
                n,
                self.objective.len()
            )));
        }
        if self.slack_indices.len() != n {
            return Err(SolverError::InvalidDimensions(format!(
                "A has {} columns but the slack map has {} entries",
                n,
                self.slack_indices.len()
            )));
        }
        if let Some(row) = self.slack_indices.iter().flatten().find(|&&row| row >= m) {
            return Err(SolverError::InvalidDimensions(format!(
                "slack column refers to row {} of {}",
                row, m
            )));
        }
        let finite = self.rhs.iter().chain(&self.objective).all(|v| v.is_finite())
            && (0..m).all(|i| self.constraints.row(i).iter().all(|v| v.is_finite()));
        if !finite {
            return Err(SolverError::InvalidDimensions("non-finite coefficient".to_string()));
        }
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.constraints.rows()
    }

    pub fn num_cols(&self) -> usize {
        self.constraints.cols()
    }

    /// Count of non-slack columns.
    pub fn num_primals(&self) -> usize {
        self.slack_indices.iter().filter(|s| s.is_none()).count()
    }

    pub fn is_slack(&self, column: usize) -> bool {
        matches!(self.slack_indices.get(column), Some(Some(_)))
    }

    /// Append a slack column for `row` with coefficient `sign` (+1 or −1) and zero cost.
    pub fn add_slack_column(&mut self, row: usize, sign: f64) -> usize {
        let mut column = vec![0.0; self.num_rows()];
        column[row] = sign;
        self.constraints.push_column(&column);
        self.objective.push(0.0);
        self.slack_indices.push(Some(row));
        self.primal_solution.clear();
        self.num_cols() - 1
    }

    /// Append the inequality `coefficients·x ≤ rhs` as a new row with its own slack.
    ///
    /// `coefficients` may be shorter than the current column count; missing
    /// entries are zero. A negative right-hand side is stored negated, with
    /// the slack entering as surplus.
    pub fn push_le_row(&mut self, coefficients: &[f64], rhs: f64) -> Result<usize, SolverError> {
        let n = self.num_cols();
        if coefficients.len() > n {
            return Err(SolverError::InvalidDimensions(format!(
                "row has {} coefficients but the form has {} columns",
                coefficients.len(),
                n
            )));
        }
        let sign = if rhs < 0.0 { -1.0 } else { 1.0 };
        let mut row = vec![0.0; n];
        for (dst, &coef) in row.iter_mut().zip(coefficients) {
            *dst = sign * coef;
        }
        self.constraints.push_row(&row);
        self.rhs.push(sign * rhs);
        let row_index = self.num_rows() - 1;
        self.add_slack_column(row_index, sign);
        Ok(row_index)
    }

    /// Forget any previous solve.
    pub fn reset_solution(&mut self) {
        self.primal_solution.clear();
        self.objective_value = 0.0;
        self.status = SolverStatus::NotSolved;
        self.duals.clear();
        self.basis.clear();
        self.iterations = 0;
    }

    /// Largest `|A·x − b|` over all rows.
    pub fn residual(&self, x: &[f64]) -> f64 {
        self.constraints
            .mul_vec(x)
            .iter()
            .zip(&self.rhs)
            .map(|(ax, b)| (ax - b).abs())
            .fold(0.0, f64::max)
    }
}
