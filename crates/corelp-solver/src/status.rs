/// Outcome of a solve, stored on the standard computational form.
///
/// `Infeasible` and `Unbounded` are ordinary terminal answers. Numerical
/// failures are reported through [`crate::SolverError`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SolverStatus {
    /// No solve has completed yet
    #[default]
    NotSolved,
    /// An optimal solution was found
    Optimal,
    /// The problem is infeasible (no solution exists)
    Infeasible,
    /// The problem is unbounded
    Unbounded,
}

impl SolverStatus {
    pub fn is_optimal(self) -> bool {
        matches!(self, SolverStatus::Optimal)
    }

    /// True for the three statuses a finished solve can end in.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SolverStatus::NotSolved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SolverStatus::NotSolved => "not_solved",
            SolverStatus::Optimal => "optimal",
            SolverStatus::Infeasible => "infeasible",
            SolverStatus::Unbounded => "unbounded",
        }
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
