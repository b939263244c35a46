//! Chain error types.
//!
//! All variants are local validation failures returned to the caller and
//! surfaced verbatim by the administrator UI; none is swallowed.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while mutating the approval chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// No step with the given id exists in the chain.
    #[error("Workflow step {0} not found")]
    StepNotFound(Uuid),

    /// The system step cannot be removed or edited.
    #[error("System step {0} cannot be modified")]
    SystemStepImmutable(Uuid),

    /// Conditional trigger is missing its threshold, carries a negative
    /// threshold, or names an unknown condition type.
    #[error("Invalid condition: {detail}")]
    InvalidCondition {
        /// What is wrong with the condition.
        detail: String,
    },

    /// A step references a role that is not in the registry.
    #[error("Role {0} is not defined in the role registry")]
    UnknownRole(Uuid),

    /// `add_step` without an explicit role requires at least one role
    /// in the registry.
    #[error("Cannot default the step role: the role registry is empty")]
    NoDefaultRole,

    /// Post-mutation invariant check failed: the system step is no longer
    /// the sole final step. The mutation was rejected, not repaired.
    #[error("Chain invariant violated: the system step must be the sole final step")]
    SystemStepDisplaced,
}

impl ChainError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::StepNotFound(_) => 404,
            Self::InvalidCondition { .. } => 400,
            Self::SystemStepImmutable(_) | Self::UnknownRole(_) | Self::NoDefaultRole => 422,
            Self::SystemStepDisplaced => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::StepNotFound(_) => "STEP_NOT_FOUND",
            Self::SystemStepImmutable(_) => "SYSTEM_STEP_IMMUTABLE",
            Self::InvalidCondition { .. } => "INVALID_CONDITION",
            Self::UnknownRole(_) => "UNKNOWN_ROLE",
            Self::NoDefaultRole => "NO_DEFAULT_ROLE",
            Self::SystemStepDisplaced => "SYSTEM_STEP_DISPLACED",
        }
    }
}
