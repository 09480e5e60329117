//! Frame worker binary.

use std::net::SocketAddr;

use tracing::{error, info};

use vcluster_client::RegistryClient;
use vcluster_models::NodeRecord;
use vcluster_service::{init_tracing, shutdown_signal};
use vcluster_worker::{create_router, generate_node_id, AppState, Registrar, WorkerConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting vcluster-worker");

    let config = match WorkerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(
        "Worker config: bind={}:{}, endpoint={}, transform={}, registry={}",
        config.bind_host,
        config.port,
        config.endpoint(),
        config.transform,
        config.registry_url
    );

    let addr: SocketAddr = match format!("{}:{}", config.bind_host, config.port).parse() {
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

    let node = NodeRecord::new(generate_node_id(), config.endpoint());
    let registrar = Registrar::new(
        RegistryClient::new(config.registry_url.clone()),
        node,
        config.heartbeat_interval,
    );
    let registration = tokio::spawn(registrar.run());

    let app = create_router(AppState::new(config));

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    registration.abort();
    info!("Worker shutdown complete");
}
