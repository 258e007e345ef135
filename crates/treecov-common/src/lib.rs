//! Shared infrastructure for treecov tools.
//!
//! This crate provides common utilities used by the treecov binary and library:
//! - CLI flags, styling and output format selection
//! - Error handling with actionable diagnostics
//!
//! # Toyota Way Principles
//!
//! - **Jidoka**: Rich error messages with actionable diagnostics
//! - **Andon**: Visual problem indication through consistent styling

pub mod cli;
pub mod error;

pub use cli::{Cli, OutputFormat, Verbosity};
pub use error::{Result, TreecovError};
