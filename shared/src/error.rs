//! Domain-level error taxonomy
//!
//! Errors raised by entity constructors and state transitions. Store and
//! service layers wrap these in their own enums (`StoreError`,
//! `ServiceError`) via `#[from]` conversions.

use thiserror::Error;

/// Errors produced by the entity model itself
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    /// A precondition on construction or a mutating call was violated
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The operation is illegal in the entity's current state
    #[error("State violation: {0}")]
    StateViolation(String),
}

impl DomainError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::StateViolation(msg.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
