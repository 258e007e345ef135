//! CLI module for treecov
//!
//! Argument types, command handlers and logging setup for the `treecov`
//! binary.

mod args;
mod commands;
mod logging;

pub use args::{Cli, Command, DeriveArgs, InputArgs, OverrideArgs, PathsArgs, ReplayArgs, ValidateArgs};
pub use commands::run_command;
pub use logging::init_tracing;
