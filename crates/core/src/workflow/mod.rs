//! The administrator-configured approval chain.
//!
//! A chain is an ordered list of approval steps, each bound to a role and a
//! trigger condition. At most one step is the automation-only system step,
//! and when present it always occupies the final position.
//!
//! # Modules
//!
//! - `types` - Step, approver, and condition types
//! - `chain` - The chain itself and its guarded mutations
//! - `error` - Chain-specific error types

pub mod chain;
pub mod error;
pub mod types;

#[cfg(test)]
mod chain_props;

pub use chain::WorkflowChain;
pub use error::ChainError;
pub use types::{MoveDirection, NewStepSpec, StepApprover, StepCondition, StepUpdate, WorkflowStep};
