//! Frame dispatcher server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};

use vcluster_broker::{create_router, metrics, AppState, BrokerConfig};
use vcluster_media::{check_ffmpeg, check_ffprobe, FfmpegCodec};
use vcluster_service::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting vcluster-broker");

    let config = BrokerConfig::from_env();
    info!(
        "Broker config: host={}, port={}, registry={}, output_dir={}",
        config.host,
        config.port,
        config.registry_url,
        config.dispatcher.output_dir.display()
    );

    for check in [check_ffmpeg(), check_ffprobe()] {
        if let Err(e) = check {
            warn!("{}; uploads will fail to decode", e);
        }
    }

    let metrics_handle = if config.metrics_enabled {
        match metrics::init_metrics() {
            Ok(handle) => {
                info!("Prometheus metrics enabled at /metrics");
                Some(handle)
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    let state = AppState::new(config.clone(), Arc::new(FfmpegCodec::new()));
    let app = create_router(state, metrics_handle);

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
