//! Error types for the rotor stress solver

use thiserror::Error;

/// Main error type for rotor stress operations
#[derive(Error, Debug)]
pub enum RotorError {
    /// Non-physical material or geometry input
    #[error("Invalid input: {0}")]
    InputDomain(String),

    /// Degenerate stack or linear system
    #[error("Singular system: {0}")]
    SingularSystem(String),

    /// No sleeve design satisfies every limit inside the search bounds
    #[error("Infeasible design after {evaluations} evaluations: {reason}")]
    InfeasibleDesign { reason: String, evaluations: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RotorError {
    /// True for the recoverable "rejected candidate" outcome of a sleeve search
    pub fn is_infeasible(&self) -> bool {
        matches!(self, RotorError::InfeasibleDesign { .. })
    }

    /// True for errors that should abort the current evaluation
    pub fn is_fatal(&self) -> bool {
        !self.is_infeasible()
    }

    pub(crate) fn infeasible(reason: impl Into<String>, evaluations: usize) -> Self {
        RotorError::InfeasibleDesign {
            reason: reason.into(),
            evaluations,
        }
    }
}

/// Result type for rotor stress operations
pub type RotorResult<T> = Result<T, RotorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_is_not_fatal() {
        let err = RotorError::infeasible("sleeve hoop limit", 12);
        assert!(err.is_infeasible());
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("12 evaluations"));
    }

    #[test]
    fn test_domain_errors_are_fatal() {
        assert!(RotorError::InputDomain("E <= 0".into()).is_fatal());
        assert!(RotorError::SingularSystem("zero thickness".into()).is_fatal());
    }
}
