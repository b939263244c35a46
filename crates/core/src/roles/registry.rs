//! The administrator-owned role table.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::roles::error::RoleError;
use crate::roles::types::{Permission, PermissionSet, Role};

/// Ordered table of role definitions.
///
/// Insertion order is preserved; the first role is the default for newly
/// created workflow steps. Mutation goes through this API only, and the
/// caller serializes configuration edits (single administrator session).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleRegistry {
    roles: Vec<Role>,
}

impl RoleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the roles in insertion order.
    #[must_use]
    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    /// Returns the default role for new workflow steps, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Role> {
        self.roles.first()
    }

    /// Returns whether a role with the given id exists.
    #[must_use]
    pub fn contains(&self, id: Uuid) -> bool {
        self.roles.iter().any(|r| r.id == id)
    }

    /// Looks up a role by id.
    pub fn get(&self, id: Uuid) -> Result<&Role, RoleError> {
        self.roles
            .iter()
            .find(|r| r.id == id)
            .ok_or(RoleError::RoleNotFound(id))
    }

    /// Creates a role with a fresh id and view-only permissions.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
    ) -> &Role {
        self.add_with_permissions(name, description, color, PermissionSet::viewer())
    }

    /// Creates a role with an explicit permission set (seeding).
    pub fn add_with_permissions(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
        permissions: PermissionSet,
    ) -> &Role {
        let role = Role {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            color: color.into(),
            permissions,
        };
        self.roles.push(role);
        self.roles.last().expect("role was just pushed")
    }

    /// Flips exactly one permission flag on a role and returns the updated role.
    ///
    /// No other field of the role may be mutated through this interface.
    pub fn toggle_permission(
        &mut self,
        role_id: Uuid,
        permission: Permission,
    ) -> Result<&Role, RoleError> {
        let role = self
            .roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or(RoleError::RoleNotFound(role_id))?;
        role.permissions.toggle(permission);
        Ok(role)
    }

    /// Removes a role, given the number of workflow steps currently
    /// referencing it (computed by the chain owner).
    ///
    /// # Errors
    /// * `RoleError::RoleNotFound` if the role does not exist
    /// * `RoleError::OrphanedRoleReference` if `references > 0`; the
    ///   registry is unchanged
    pub fn remove(&mut self, role_id: Uuid, references: usize) -> Result<Role, RoleError> {
        let index = self
            .roles
            .iter()
            .position(|r| r.id == role_id)
            .ok_or(RoleError::RoleNotFound(role_id))?;

        if references > 0 {
            return Err(RoleError::OrphanedRoleReference {
                role_id,
                steps: references,
            });
        }

        Ok(self.roles.remove(index))
    }
}
