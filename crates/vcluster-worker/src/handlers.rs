//! Worker HTTP handlers.

use axum::extract::State;
use axum::Json;
use tracing::{debug, warn};
use vcluster_models::{FrameResult, FrameTask, WorkerHealth};

use crate::error::WorkerResult;
use crate::state::AppState;

/// `GET /health`
pub async fn health() -> Json<WorkerHealth> {
    Json(WorkerHealth::ok())
}

/// `POST /process-frame`
pub async fn process_frame(
    State(state): State<AppState>,
    Json(task): Json<FrameTask>,
) -> WorkerResult<Json<FrameResult>> {
    let job_id = task.job_id.clone();
    let frame_index = task.frame_index;

    match state.processor.process(task).await {
        Ok(result) => {
            debug!(job_id = %job_id, frame_index, "Processed frame");
            Ok(Json(result))
        }
        Err(e) => {
            warn!(job_id = %job_id, frame_index, "Frame processing failed: {}", e);
            Err(e)
        }
    }
}
