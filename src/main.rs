//! Tactical overview server.
//!
//! Serves fleet health counters and network outage analysis as JSON.

use tactical::config::ServerConfig;
use tactical::web::Server;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("tactical=info".parse()?))
        .init();

    // Load configuration
    let cfg = ServerConfig::load();
    tracing::info!("Starting tactical overview on port {}...", cfg.http_port);
    tracing::info!("Reading status snapshots from {}", cfg.snapshot_path);
    match &cfg.authorized_hosts {
        Some(hosts) => tracing::info!("Visibility restricted to {} hosts", hosts.len()),
        None => tracing::info!("All hosts visible"),
    }

    let server = Server::new(cfg);
    server.start().await?;

    Ok(())
}
