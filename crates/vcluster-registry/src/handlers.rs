//! Registry HTTP handlers.

use axum::extract::State;
use axum::Json;
use vcluster_models::{NodeRecord, NodesResponse, RegisterResponse};
use vcluster_service::HealthResponse;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// `POST /register-node`
pub async fn register_node(
    State(state): State<AppState>,
    Json(node): Json<NodeRecord>,
) -> ApiResult<Json<RegisterResponse>> {
    if node.id.trim().is_empty() {
        return Err(ApiError::bad_request("node id must not be empty"));
    }
    if node.endpoint.trim().is_empty() {
        return Err(ApiError::bad_request("node endpoint must not be empty"));
    }

    let count = state.registry.register(node).await;

    Ok(Json(RegisterResponse {
        message: "Node registered".to_string(),
        count,
    }))
}

/// `GET /nodes`
pub async fn list_nodes(State(state): State<AppState>) -> Json<NodesResponse> {
    Json(NodesResponse {
        nodes: state.registry.list().await,
    })
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok("vcluster-registry", env!("CARGO_PKG_VERSION")))
}
