//! Derivation configuration.
//!
//! A [`DeriveConfig`] is an explicit value passed into every derivation; it
//! is loaded from YAML, optionally overridden from CLI flags, and validated
//! by [`ConfigValidator`] before any tree is walked.

mod schema;
mod validate;

#[cfg(test)]
mod proptests;

pub use schema::{parse_criteria, Criterion, DeriveConfig, DrawMode, WidthBasis};
pub use validate::ConfigValidator;
