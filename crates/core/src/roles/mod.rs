//! Role definitions and permission sets for Waybill.
//!
//! Roles gate who may act on approval steps. Permissions are a closed
//! enumeration; unknown permission keys are rejected at parse time.
//!
//! # Modules
//!
//! - `types` - Permission, PermissionSet, and Role
//! - `registry` - The administrator-owned role table
//! - `error` - Role-specific error types

pub mod error;
pub mod registry;
pub mod types;

pub use error::RoleError;
pub use registry::RoleRegistry;
pub use types::{Permission, PermissionSet, Role};
