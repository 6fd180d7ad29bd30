//! CLI module for Bookshelf
//!
//! Provides command-line interface for:
//! - serve: Start the HTTP server
//! - check-config: Validate a configuration file

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check_config, open_store, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
