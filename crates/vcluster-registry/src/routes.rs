//! Registry routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use vcluster_service::{cors_layer, request_id, request_logging};

use crate::handlers::{health, list_nodes, register_node};
use crate::state::AppState;

/// Create the registry router.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/register-node", post(register_node))
        .route("/nodes", get(list_nodes))
        .route("/health", get(health))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors)
        .with_state(state)
}
