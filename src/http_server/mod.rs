//! # HTTP Server Module
//!
//! Axum server exposing the book catalog.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/books/*` - Book catalog operations

pub mod config;
pub mod health;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
