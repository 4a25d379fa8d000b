//! Error types for the strut solver and layout crates.

use thiserror::Error;

/// Errors reported by the simplex solver.
///
/// Every error is returned synchronously from the offending call. A failed
/// call leaves the solver in the state it had before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("Constraint is already active: {constraint}")]
    DuplicateConstraint { constraint: String },

    #[error("Constraint is not active in the solver: {constraint}")]
    UnknownConstraint { constraint: String },

    #[error("Required constraint cannot be satisfied: {constraint}")]
    UnsatisfiableConstraint { constraint: String },

    #[error("Variable '{variable}' is already an edit variable")]
    DuplicateEditVariable { variable: String },

    #[error("Variable '{variable}' is not an edit variable")]
    UnknownEditVariable { variable: String },

    #[error("Edit variable '{variable}' cannot use required strength")]
    InvalidEditStrength { variable: String },

    #[error("Suggested value {value} for '{variable}' is not finite")]
    InvalidSuggestion { variable: String, value: f64 },

    #[error("Constraint has a non-finite coefficient or constant: {constraint}")]
    NonFiniteConstraint { constraint: String },

    /// A simplex invariant broke. The tableau still describes the active
    /// constraints but may be infeasible; reset the solver before reuse.
    #[error("Internal solver error: {0}")]
    Internal(&'static str),
}

impl SolverError {
    /// Whether the caller can recover by ignoring the error.
    ///
    /// Duplicate registrations leave the solver exactly as it was and the
    /// requested state already holds.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self,
            SolverError::DuplicateConstraint { .. } | SolverError::DuplicateEditVariable { .. }
        )
    }
}

/// Errors during layout computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Constraint error: {0}")]
    Solver(#[from] SolverError),

    #[error("Unknown area: {name}")]
    UnknownArea { name: String },

    #[error("Invalid layout options: {reason}")]
    InvalidOptions { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_error_messages() {
        let err = SolverError::UnsatisfiableConstraint {
            constraint: "x - 6 == 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Required constraint cannot be satisfied: x - 6 == 0"
        );

        let err = SolverError::InvalidSuggestion {
            variable: "x".to_string(),
            value: f64::NAN,
        };
        assert_eq!(err.to_string(), "Suggested value NaN for 'x' is not finite");

        let err = SolverError::InvalidEditStrength {
            variable: "width".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Edit variable 'width' cannot use required strength"
        );
    }

    #[test]
    fn test_layout_error_wraps_solver_error() {
        let err: LayoutError = SolverError::Internal("Unbounded objective").into();
        assert!(matches!(err, LayoutError::Solver(SolverError::Internal(_))));
        assert_eq!(
            err.to_string(),
            "Constraint error: Internal solver error: Unbounded objective"
        );
    }

    #[test]
    fn test_duplicate_is_recoverable() {
        assert!(SolverError::DuplicateConstraint {
            constraint: String::new()
        }
        .is_duplicate());
        assert!(!SolverError::UnknownConstraint {
            constraint: String::new()
        }
        .is_duplicate());
    }
}
