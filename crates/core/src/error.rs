//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on expected, user-facing failures (bad input, missing
/// records, business rules). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input failed validation. Carries every violated constraint.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A record (or a referenced cell) could not be found.
    #[error("{0}")]
    NotFound(String),

    /// A business rule rejected the request.
    #[error("{0}")]
    BusinessRule(String),

    /// A conditional write kept losing against concurrent writers.
    #[error("{0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(violations: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Validation(violations.into_iter().map(Into::into).collect())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn business(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Violated constraints, if this is a validation error.
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Validation(v) => v,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_joins_every_violation() {
        let err = DomainError::validation(["shk is required", "kolvo is required"]);
        assert_eq!(
            err.to_string(),
            "Validation failed: shk is required, kolvo is required"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn business_errors_render_their_message_verbatim() {
        let err = DomainError::business("Запись не найдена");
        assert_eq!(err.to_string(), "Запись не найдена");
        assert!(err.violations().is_empty());
    }
}
