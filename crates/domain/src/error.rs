//! Unified error types for the domain layer
//!
//! Entities return `DomainError` when a mutation would break one of their
//! invariants. Command handlers translate these into client-facing reasons.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity not found
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Business rule violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A tank, hold or similar container cannot take the requested amount
    #[error("Capacity exceeded: requested {requested}, free {free}")]
    CapacityExceeded { requested: u32, free: u32 },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// # Example
    /// ```ignore
    /// if name.trim().is_empty() {
    ///     return Err(DomainError::validation("Campaign name cannot be empty"));
    /// }
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Create a constraint violation error
    pub fn constraint(msg: impl Into<String>) -> Self {
        Self::Constraint(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Human-readable reason suitable for showing to players.
    pub fn reason(&self) -> String {
        match self {
            Self::Validation(msg) | Self::Constraint(msg) | Self::Parse(msg) => msg.clone(),
            Self::NotFound { entity_type, .. } => format!("{entity_type} not found"),
            Self::CapacityExceeded { requested, free } => format!(
                "Insufficient tank capacity: requested {requested} tons but only {free} tons free"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_reason_mentions_both_amounts() {
        let err = DomainError::CapacityExceeded {
            requested: 25,
            free: 20,
        };
        let reason = err.reason();
        assert!(reason.contains("25"));
        assert!(reason.contains("20"));
    }

    #[test]
    fn not_found_reason_hides_id() {
        let err = DomainError::not_found("Contact", "abc");
        assert_eq!(err.reason(), "Contact not found");
    }
}
