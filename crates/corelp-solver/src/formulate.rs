//! Lowering a [`Model`] into standard computational form.

use crate::error::SolverError;
use crate::linalg::Matrix;
use crate::problem::{ConstraintOp, Model, Sense, VariableCategory};
use crate::scf::StandardComputationalForm;

/// A model lowered to `min c·x, A·x = b, x ≥ 0`, plus what is needed to map
/// results back onto the model.
#[derive(Debug, Clone)]
pub struct Formulation {
    pub scf: StandardComputationalForm,
    /// Per SCF column: true for Integer/Binary variables
    pub integrality: Vec<bool>,
    /// Per model constraint: −1 if the row was negated to make its rhs non-negative
    pub row_signs: Vec<f64>,
    /// Per model constraint: its slack column, `None` for equalities
    pub slack_columns: Vec<Option<usize>>,
    /// −1 when the model maximizes
    pub objective_sign: f64,
    pub num_variables: usize,
}

/// Build the SCF for `model`.
///
/// Rows with a negative rhs are negated and their operator flipped. Binary
/// variables get an extra `x ≤ 1` row after the model's constraints. Every
/// non-equality row gets one slack column (+1 for `≤`, −1 for `≥`).
pub fn formulate(model: &Model) -> Result<Formulation, SolverError> {
    let n = model.num_variables();
    if model.objective.coefficients.len() != n {
        return Err(SolverError::InvalidDimensions(format!(
            "objective has {} coefficients for {} variables",
            model.objective.coefficients.len(),
            n
        )));
    }

    let mut rows = Vec::with_capacity(model.num_constraints());
    let mut rhs = Vec::with_capacity(model.num_constraints());
    let mut ops = Vec::with_capacity(model.num_constraints());
    let mut row_signs = Vec::with_capacity(model.num_constraints());

    for constraint in &model.constraints {
        if constraint.coefficients.len() != n {
            return Err(SolverError::InvalidDimensions(format!(
                "constraint '{}' has {} coefficients for {} variables",
                constraint.name,
                constraint.coefficients.len(),
                n
            )));
        }
        let sign = if constraint.rhs < 0.0 { -1.0 } else { 1.0 };
        rows.push(constraint.coefficients.iter().map(|c| sign * c).collect::<Vec<f64>>());
        rhs.push(sign * constraint.rhs);
        ops.push(if sign < 0.0 { constraint.op.flipped() } else { constraint.op });
        row_signs.push(sign);
    }

    for (j, variable) in model.variables.iter().enumerate() {
        if variable.category == VariableCategory::Binary {
            let mut row = vec![0.0; n];
            row[j] = 1.0;
            rows.push(row);
            rhs.push(1.0);
            ops.push(ConstraintOp::Le);
        }
    }

    let constraints = if rows.is_empty() {
        Matrix::zeros(0, n)
    } else {
        Matrix::from_rows(rows)
            .ok_or_else(|| SolverError::InvalidDimensions("constraint rows have differing lengths".to_string()))?
    };

    let objective_sign = match model.objective.sense {
        Sense::Minimize => 1.0,
        Sense::Maximize => -1.0,
    };
    let objective = model.objective.coefficients.iter().map(|c| objective_sign * c).collect();

    let mut scf = StandardComputationalForm::new(constraints, rhs, objective)?;

    let mut slack_columns = Vec::with_capacity(ops.len());
    for (row, op) in ops.iter().enumerate() {
        let column = match op {
            ConstraintOp::Le => Some(scf.add_slack_column(row, 1.0)),
            ConstraintOp::Ge => Some(scf.add_slack_column(row, -1.0)),
            ConstraintOp::Eq => None,
        };
        slack_columns.push(column);
    }
    slack_columns.truncate(model.num_constraints());

    let mut integrality: Vec<bool> = model.variables.iter().map(|v| v.category.is_integer()).collect();
    integrality.resize(scf.num_cols(), false);

    Ok(Formulation {
        scf,
        integrality,
        row_signs,
        slack_columns,
        objective_sign,
        num_variables: n,
    })
}
