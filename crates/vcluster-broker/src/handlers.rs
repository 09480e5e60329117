//! Broker HTTP handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::info;
use vcluster_models::{JobId, JobStatus, JobSummary, StatusResponse, SubmitResponse};
use vcluster_service::HealthResponse;

use crate::dispatcher::FetchOutcome;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field carrying the video.
const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub job_id: String,
    pub cancelled: bool,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobSummary>,
}

/// `POST /upload-video`
///
/// Takes the `file` field, or the first field when none is named `file`.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<SubmitResponse>> {
    let mut video = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        let is_upload_field = field.name() == Some(UPLOAD_FIELD);
        if !is_upload_field && video.is_some() {
            continue;
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("failed to read upload: {}", e)))?;
        video = Some(bytes);

        if is_upload_field {
            break;
        }
    }

    let video = video.ok_or_else(|| ApiError::bad_request("no video file in upload"))?;
    let job_id = state.dispatcher.submit(video.to_vec()).await;

    Ok(Json(SubmitResponse {
        job_id: job_id.to_string(),
        status: JobStatus::Processing,
    }))
}

/// `GET /status/:job_id`
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<StatusResponse> {
    let response = match state.dispatcher.job(&JobId::from_string(&job_id)).await {
        Some(job) => StatusResponse::from(&job),
        None => StatusResponse::unknown(job_id),
    };
    Json(response)
}

/// `GET /download/:job_id`
pub async fn download(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Response> {
    match state.dispatcher.fetch(&JobId::from_string(&job_id)).await? {
        FetchOutcome::Ready(bytes) => {
            let disposition = format!("attachment; filename=\"{}_output.mp4\"", job_id);
            Ok((
                [
                    (header::CONTENT_TYPE, "video/mp4".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response())
        }
        FetchOutcome::NotReady(status) => Err(ApiError::NotReady {
            job_id,
            status: status.to_string(),
        }),
        FetchOutcome::Unknown => Err(ApiError::not_found(format!("job {}", job_id))),
    }
}

/// `POST /jobs/:job_id/cancel`
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<CancelResponse> {
    let cancelled = state.dispatcher.cancel(&JobId::from_string(&job_id)).await;
    info!(job_id = %job_id, cancelled, "Cancel request");
    Json(CancelResponse { job_id, cancelled })
}

/// `GET /jobs`
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobsResponse> {
    let jobs = state
        .dispatcher
        .list_jobs()
        .await
        .iter()
        .map(JobSummary::from)
        .collect();
    Json(JobsResponse { jobs })
}

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok("vcluster-broker", env!("CARGO_PKG_VERSION")))
}
