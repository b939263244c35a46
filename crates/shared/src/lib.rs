//! Shared configuration and error types for Waybill.
//!
//! This crate provides the pieces used across the other crates:
//! - Layered application configuration
//! - Application-wide error envelope

pub mod config;
pub mod error;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
