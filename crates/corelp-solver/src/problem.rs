use crate::error::SolverError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A linear or integer program in caller terms: named variables, a sense,
/// and dense constraint rows.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Model {
    pub name: String,
    pub variables: Vec<Variable>,
    pub objective: Objective,
    #[cfg_attr(feature = "serde", serde(default))]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub category: VariableCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VariableCategory {
    #[default]
    Continuous,
    Integer,
    /// Integer in `[0, 1]`
    Binary,
}

impl VariableCategory {
    pub fn is_integer(self) -> bool {
        matches!(self, VariableCategory::Integer | VariableCategory::Binary)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sense: Sense,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    #[cfg_attr(feature = "serde", serde(rename = "<=", alias = "le"))]
    Le,
    /// Greater than or equal (>=)
    #[cfg_attr(feature = "serde", serde(rename = ">=", alias = "ge"))]
    Ge,
    /// Equal (=)
    #[cfg_attr(feature = "serde", serde(rename = "=", alias = "eq"))]
    Eq,
}

impl ConstraintOp {
    /// The operator obtained by multiplying both sides by −1.
    pub fn flipped(self) -> Self {
        match self {
            ConstraintOp::Le => ConstraintOp::Ge,
            ConstraintOp::Ge => ConstraintOp::Le,
            ConstraintOp::Eq => ConstraintOp::Eq,
        }
    }
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            objective: Objective {
                coefficients: Vec::new(),
                sense: Sense::Minimize,
            },
            constraints: Vec::new(),
        }
    }

    /// Append a variable and return its column index.
    pub fn add_variable(&mut self, name: impl Into<String>, category: VariableCategory) -> usize {
        self.variables.push(Variable {
            name: name.into(),
            category,
        });
        self.variables.len() - 1
    }

    pub fn set_objective(&mut self, sense: Sense, coefficients: Vec<f64>) {
        self.objective = Objective { coefficients, sense };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            op,
            rhs,
        });
    }

    /// Add a constraint from `(variable name, coefficient)` terms.
    ///
    /// Repeated names accumulate; unnamed variables get zero.
    pub fn add_term_constraint(
        &mut self,
        name: impl Into<String>,
        terms: &[(&str, f64)],
        op: ConstraintOp,
        rhs: f64,
    ) -> Result<(), SolverError> {
        let mut coefficients = vec![0.0; self.variables.len()];
        for &(var, coef) in terms {
            let index = self
                .variable_index(var)
                .ok_or_else(|| SolverError::UnknownVariable(var.to_string()))?;
            coefficients[index] += coef;
        }
        self.add_constraint(name, coefficients, op, rhs);
        Ok(())
    }

    pub fn variable_index(&self, name: &str) -> Option<usize> {
        self.variables.iter().position(|v| v.name == name)
    }

    /// True when any variable must take integer values.
    pub fn is_integer(&self) -> bool {
        self.variables.iter().any(|v| v.category.is_integer())
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
