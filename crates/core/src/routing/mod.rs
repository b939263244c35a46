//! The invoice approval routing engine.
//!
//! Given an invoice and a snapshot of the approval chain, computes the
//! applicable sub-chain, tracks per-step sign-off, and derives the terminal
//! invoice status. Manual administrator overrides bypass the chain and are
//! recorded as such.
//!
//! # Modules
//!
//! - `types` - Decision, step state, and status types
//! - `engine` - Sub-chain computation and step transitions
//! - `error` - Routing-specific error types

pub mod engine;
pub mod error;
pub mod types;

#[cfg(test)]
mod engine_props;

pub use engine::RoutingEngine;
pub use error::RoutingError;
pub use types::{
    InvoiceStatus, ManualOverride, OverrideKind, RoutedStep, RoutingDecision, StepState,
};
