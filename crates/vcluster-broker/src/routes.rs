//! Broker routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use vcluster_service::{cors_layer, request_id, request_logging};

use crate::handlers::{cancel_job, download, health, job_status, list_jobs, upload_video};
use crate::metrics::metrics_middleware;
use crate::state::AppState;

/// Create the broker router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let job_routes = Router::new()
        .route("/upload-video", post(upload_video))
        .route("/status/:job_id", get(job_status))
        .route("/download/:job_id", get(download))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:job_id/cancel", post(cancel_job));

    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    let cors = cors_layer(&state.config.cors_origins);
    let max_body_size = state.config.max_body_size;

    Router::new()
        .merge(job_routes)
        .route("/health", get(health))
        .merge(metrics_routes)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors)
        .with_state(state)
}
