//! Role error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during role operations.
#[derive(Debug, Error)]
pub enum RoleError {
    /// Role not found in the registry.
    #[error("Role {0} not found")]
    RoleNotFound(Uuid),

    /// Attempt to delete a role still referenced by workflow steps.
    ///
    /// Referential integrity is enforced: the delete is rejected, never
    /// cascaded to the chain.
    #[error("Role {role_id} is still referenced by {steps} workflow step(s)")]
    OrphanedRoleReference {
        /// The role targeted for deletion.
        role_id: Uuid,
        /// Number of steps referencing it.
        steps: usize,
    },
}

impl RoleError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::RoleNotFound(_) => 404,
            Self::OrphanedRoleReference { .. } => 409,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::RoleNotFound(_) => "ROLE_NOT_FOUND",
            Self::OrphanedRoleReference { .. } => "ORPHANED_ROLE_REFERENCE",
        }
    }
}
