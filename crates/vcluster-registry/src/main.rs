//! Node registry server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};

use vcluster_registry::{create_router, AppState, NodeSweeper, RegistryConfig};
use vcluster_service::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting vcluster-registry");

    let config = RegistryConfig::from_env();
    info!(
        "Registry config: host={}, port={}, node_ttl={:?}",
        config.host, config.port, config.node_ttl
    );

    let state = AppState::new(config.clone());

    if config.eviction_enabled() {
        let sweeper = NodeSweeper::new(
            Arc::clone(&state.registry),
            config.node_ttl,
            config.sweep_interval,
        );
        tokio::spawn(async move {
            sweeper.run().await;
        });
    }

    let app = create_router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Invalid bind address: {}", e);
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    info!("Listening on {}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    info!("Server shutdown complete");
}
