//! Core business logic for Waybill.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and routing decisions live here.
//!
//! # Modules
//!
//! - `roles` - Role definitions and permission sets
//! - `workflow` - The administrator-configured approval chain
//! - `variance` - Invoice variance classification
//! - `routing` - The invoice approval routing engine

pub mod invoice;
pub mod roles;
pub mod routing;
pub mod variance;
pub mod workflow;
