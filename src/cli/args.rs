//! CLI argument definitions using clap
//!
//! Commands:
//! - bookshelf serve [--config <path>] [--host <host>] [--port <port>]
//! - bookshelf check-config --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bookshelf - a book catalog service
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Validate a configuration file and print the effective settings
    CheckConfig {
        /// Path to configuration file
        #[arg(long, default_value = "./bookshelf.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
