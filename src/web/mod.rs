//! Web server module.

mod handlers;

pub use handlers::*;

use crate::access::Authorizer;
use crate::config::ServerConfig;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub authorizer: Arc<dyn Authorizer + Send + Sync>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let authorizer = Arc::from(config.authorizer());
        Self { config, authorizer }
    }
}

/// JSON API server for the tactical overview.
pub struct Server {
    state: AppState,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }

    /// Build the router with all routes.
    pub fn routes(&self) -> Router {
        let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

        Router::new()
            .route("/api/health", get(handlers::handle_health))
            .route("/api/tactical", get(handlers::handle_tactical))
            .route("/api/counters", get(handlers::handle_counters))
            .route("/api/outages", get(handlers::handle_outages))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.state.clone())
    }

    /// Start the server on the configured port.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.state.config.http_port));
        let router = self.routes();

        tracing::info!("Web server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
