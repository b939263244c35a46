//! Routing error types.

use thiserror::Error;
use uuid::Uuid;

use crate::routing::types::StepState;

/// Errors that can occur while deciding steps of a routing decision.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// No applicable step with the given id exists on the decision.
    #[error("Routed step {0} not found")]
    StepNotFound(Uuid),

    /// The step already reached a terminal state.
    #[error("Step {step_id} was already decided ({state:?})")]
    StepAlreadyDecided {
        /// The step targeted by the decision.
        step_id: Uuid,
        /// Its terminal state.
        state: StepState,
    },

    /// An earlier applicable step is still awaiting approval.
    #[error("Step {0} cannot be decided before earlier steps")]
    StepOutOfOrder(Uuid),

    /// The system step is automation-only and takes no human decision.
    #[error("Step {0} is the system step and executes automatically")]
    SystemStepAutomated(Uuid),

    /// The acting role does not gate this step and is not an administrator.
    #[error("Role {role_id} is not authorized to decide step {step_id}")]
    NotAuthorizedToApprove {
        /// The acting role.
        role_id: Uuid,
        /// The step it tried to decide.
        step_id: Uuid,
    },

    /// Chain overrides require the administrator permission.
    #[error("Role {0} is not authorized to override the chain")]
    OverrideNotAuthorized(Uuid),

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,
}

impl RoutingError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::StepNotFound(_) => 404,
            Self::StepAlreadyDecided { .. } | Self::StepOutOfOrder(_) => 409,
            Self::NotAuthorizedToApprove { .. } | Self::OverrideNotAuthorized(_) => 403,
            Self::SystemStepAutomated(_) | Self::RejectionReasonRequired => 400,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::StepNotFound(_) => "STEP_NOT_FOUND",
            Self::StepAlreadyDecided { .. } => "STEP_ALREADY_DECIDED",
            Self::StepOutOfOrder(_) => "STEP_OUT_OF_ORDER",
            Self::SystemStepAutomated(_) => "SYSTEM_STEP_AUTOMATED",
            Self::NotAuthorizedToApprove { .. } => "NOT_AUTHORIZED_TO_APPROVE",
            Self::OverrideNotAuthorized(_) => "OVERRIDE_NOT_AUTHORIZED",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
        }
    }
}
