//! Invoice variance classification.
//!
//! Computes the monetary variance of an invoice (billed vs. audited) and
//! assigns a dispute reason tag. Pure functions, no side effects.

pub mod classifier;

#[cfg(test)]
mod classifier_props;

pub use classifier::{Classification, ReasonTag, VarianceClassifier};
