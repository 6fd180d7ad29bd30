//! CLI command implementations
//!
//! `serve` follows a fixed lifecycle: load config, install logging, open the
//! store, serve until Ctrl-C, then close the store.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::books::BookService;
use crate::config::{BookshelfConfig, StoreConfig};
use crate::http_server::HttpServer;
use crate::logging;
use crate::store::{BookStore, DocumentCollection};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Serve { config, host, port } => {
            let mut config = load_or_default(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config)
        }
        Command::CheckConfig { config } => check_config(&config),
    }
}

fn load_or_default(path: Option<&Path>) -> CliResult<BookshelfConfig> {
    match path {
        Some(path) => Ok(BookshelfConfig::load(path)?),
        None => Ok(BookshelfConfig::default()),
    }
}

/// Open the configured record store
pub fn open_store(config: &StoreConfig) -> CliResult<Arc<dyn BookStore>> {
    let store = match &config.data_file {
        Some(path) => DocumentCollection::open(path)?,
        None => {
            info!("using in-memory document collection");
            DocumentCollection::in_memory()
        }
    };
    Ok(Arc::new(store))
}

/// Run the HTTP server until interrupted
pub fn serve(config: BookshelfConfig) -> CliResult<()> {
    logging::init(&config.log_level).map_err(CliError::boot_failed)?;

    let store = open_store(&config.store)?;
    let service = Arc::new(BookService::new(Arc::clone(&store), &config.search));
    let server = HttpServer::with_config(config.server.clone(), service);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::boot_failed(format!("failed to start runtime: {}", e)))?;

    let served = runtime.block_on(server.start(shutdown_signal()));
    let closed = store.close();

    served?;
    closed?;
    Ok(())
}

/// Validate a config file and print the effective settings
pub fn check_config(path: &Path) -> CliResult<()> {
    let config = BookshelfConfig::load(path)?;
    let rendered = serde_json::to_string_pretty(&config)
        .map_err(|e| CliError::config_error(format!("failed to render config: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
