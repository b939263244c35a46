//! Role domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A named permission a role can hold.
///
/// This is a closed enumeration: the wire keys below are the only valid
/// permission names, and anything else fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    /// May view the invoice audit queue.
    #[serde(rename = "canViewInvoices")]
    ViewInvoices,
    /// May decide first-level approval steps.
    #[serde(rename = "canApproveL1")]
    ApproveL1,
    /// May decide deeper approval steps.
    #[serde(rename = "canApproveL2")]
    ApproveL2,
    /// May manage carrier rate tables.
    #[serde(rename = "canManageRates")]
    ManageRates,
    /// Full administrative access, including acting on any step.
    #[serde(rename = "canAdminSystem")]
    AdminSystem,
}

impl Permission {
    /// All permissions, in display order.
    pub const ALL: [Self; 5] = [
        Self::ViewInvoices,
        Self::ApproveL1,
        Self::ApproveL2,
        Self::ManageRates,
        Self::AdminSystem,
    ];

    /// Parse a permission from its wire key.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "canViewInvoices" => Some(Self::ViewInvoices),
            "canApproveL1" => Some(Self::ApproveL1),
            "canApproveL2" => Some(Self::ApproveL2),
            "canManageRates" => Some(Self::ManageRates),
            "canAdminSystem" => Some(Self::AdminSystem),
            _ => None,
        }
    }

    /// Returns the wire key of the permission.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ViewInvoices => "canViewInvoices",
            Self::ApproveL1 => "canApproveL1",
            Self::ApproveL2 => "canApproveL2",
            Self::ManageRates => "canManageRates",
            Self::AdminSystem => "canAdminSystem",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One boolean per permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSet {
    /// May view the invoice audit queue.
    pub can_view_invoices: bool,
    /// May decide first-level approval steps.
    pub can_approve_l1: bool,
    /// May decide deeper approval steps.
    pub can_approve_l2: bool,
    /// May manage carrier rate tables.
    pub can_manage_rates: bool,
    /// Full administrative access.
    pub can_admin_system: bool,
}

impl PermissionSet {
    /// Default set for a newly created role: view access only.
    #[must_use]
    pub const fn viewer() -> Self {
        Self {
            can_view_invoices: true,
            can_approve_l1: false,
            can_approve_l2: false,
            can_manage_rates: false,
            can_admin_system: false,
        }
    }

    /// Every permission granted.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            can_view_invoices: true,
            can_approve_l1: true,
            can_approve_l2: true,
            can_manage_rates: true,
            can_admin_system: true,
        }
    }

    /// Returns whether the given permission is granted.
    #[must_use]
    pub const fn has(&self, permission: Permission) -> bool {
        match permission {
            Permission::ViewInvoices => self.can_view_invoices,
            Permission::ApproveL1 => self.can_approve_l1,
            Permission::ApproveL2 => self.can_approve_l2,
            Permission::ManageRates => self.can_manage_rates,
            Permission::AdminSystem => self.can_admin_system,
        }
    }

    /// Sets a single permission flag.
    pub const fn set(&mut self, permission: Permission, granted: bool) {
        match permission {
            Permission::ViewInvoices => self.can_view_invoices = granted,
            Permission::ApproveL1 => self.can_approve_l1 = granted,
            Permission::ApproveL2 => self.can_approve_l2 = granted,
            Permission::ManageRates => self.can_manage_rates = granted,
            Permission::AdminSystem => self.can_admin_system = granted,
        }
    }

    /// Flips exactly one permission flag and returns the new value.
    pub const fn toggle(&mut self, permission: Permission) -> bool {
        let next = !self.has(permission);
        self.set(permission, next);
        next
    }
}

/// A role in the audit organization.
///
/// `color` is presentation-only and carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Unique identifier for the role.
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Display color for the dashboard badge.
    pub color: String,
    /// Permission flags.
    pub permissions: PermissionSet,
}
