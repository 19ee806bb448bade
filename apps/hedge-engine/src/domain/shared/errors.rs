//! Domain errors shared across bounded contexts.

use std::fmt;

/// Domain-level errors that can occur in business logic.
///
/// These errors are independent of infrastructure concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid value for a field.
    InvalidValue {
        /// Field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Entity not found.
    NotFound {
        /// Entity type.
        entity_type: String,
        /// Entity identifier.
        id: String,
    },

    /// Aggregate invariant violated.
    InvariantViolation {
        /// Aggregate type.
        aggregate: String,
        /// Invariant that was violated.
        invariant: String,
    },
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { field, message } => {
                write!(f, "invalid value for {field}: {message}")
            }
            Self::NotFound { entity_type, id } => write!(f, "{entity_type} not found: {id}"),
            Self::InvariantViolation {
                aggregate,
                invariant,
            } => write!(f, "{aggregate} invariant violated: {invariant}"),
        }
    }
}

impl std::error::Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = DomainError::NotFound {
            entity_type: "Company".to_string(),
            id: "co-1".to_string(),
        };
        assert_eq!(err.to_string(), "Company not found: co-1");
    }

    #[test]
    fn display_invalid_value() {
        let err = DomainError::InvalidValue {
            field: "fx_pair".to_string(),
            message: "too short".to_string(),
        };
        assert!(err.to_string().contains("fx_pair"));
    }
}
