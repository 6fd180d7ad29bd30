//! # HTTP Server
//!
//! Combines the health and book routers, applies CORS, tracing and timeout
//! layers, and serves until the shutdown future resolves.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::books::{book_routes, BookService};

use super::config::HttpServerConfig;
use super::health::health_routes;

/// HTTP server for the book catalog
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with default configuration
    pub fn new(service: Arc<BookService>) -> Self {
        Self::with_config(HttpServerConfig::default(), service)
    }

    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, service: Arc<BookService>) -> Self {
        let router = Self::build_router(&config, service);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, service: Arc<BookService>) -> Router {
        let routes = Router::new()
            .merge(health_routes())
            .merge(book_routes(service));
        Self::with_layers(routes, config)
    }

    /// Wrap `routes` in the trace, timeout and CORS layers.
    ///
    /// A request that outlives `request_timeout_secs` is answered with 408.
    pub fn with_layers(routes: Router, config: &HttpServerConfig) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        routes.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.request_timeout()))
                .layer(cors),
        )
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn start<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "bookshelf listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}
