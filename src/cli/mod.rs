//! CLI module
//!
//! Command-line interface for running the target.
//!
//! # Commands
//!
//! - `run` - Read tap messages and write records to the bucket
//! - `validate` - Check configuration
//! - `about` - Show supported settings

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
