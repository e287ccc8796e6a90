//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the taglink binary.

mod chain;
mod commands;
mod normalize;
mod run;

pub use chain::{seal_task, verify_task};
pub use commands::{Cli, Commands};
pub use normalize::normalize_source;
pub use run::run_task;
