//! Prometheus metrics for the broker.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder. Returns a handle that renders metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vcluster_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vcluster_http_request_duration_seconds";

    // Job metrics
    pub const JOBS_SUBMITTED_TOTAL: &str = "vcluster_jobs_submitted_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "vcluster_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "vcluster_jobs_failed_total";
    pub const JOBS_IN_PROGRESS: &str = "vcluster_jobs_in_progress";
    pub const JOB_DURATION_SECONDS: &str = "vcluster_job_duration_seconds";

    // Dispatch metrics
    pub const FRAMES_DISPATCHED_TOTAL: &str = "vcluster_frames_dispatched_total";
    pub const FRAME_ATTEMPTS_FAILED_TOTAL: &str = "vcluster_frame_attempts_failed_total";
    pub const FRAME_FAILOVERS_TOTAL: &str = "vcluster_frame_failovers_total";
    pub const NODES_HEALTHY: &str = "vcluster_nodes_healthy";
}

pub fn record_job_submitted() {
    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
    gauge!(names::JOBS_IN_PROGRESS).increment(1.0);
}

pub fn record_job_completed(duration_secs: f64) {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
    gauge!(names::JOBS_IN_PROGRESS).decrement(1.0);
    histogram!(names::JOB_DURATION_SECONDS).record(duration_secs);
}

pub fn record_job_failed(reason: &'static str, duration_secs: f64) {
    counter!(names::JOBS_FAILED_TOTAL, "reason" => reason).increment(1);
    gauge!(names::JOBS_IN_PROGRESS).decrement(1.0);
    histogram!(names::JOB_DURATION_SECONDS).record(duration_secs);
}

/// Record a frame delivered by a worker.
pub fn record_frame_dispatched() {
    counter!(names::FRAMES_DISPATCHED_TOTAL).increment(1);
}

pub fn record_frame_attempt_failed(node_id: &str) {
    counter!(names::FRAME_ATTEMPTS_FAILED_TOTAL, "node" => node_id.to_string()).increment(1);
}

/// Record a frame that succeeded on a fallback node.
pub fn record_frame_failover() {
    counter!(names::FRAME_FAILOVERS_TOTAL).increment(1);
}

pub fn set_healthy_nodes(count: usize) {
    gauge!(names::NODES_HEALTHY).set(count as f64);
}

/// Collapse job ids so label cardinality stays bounded.
fn route_label(path: &str) -> String {
    let mut segments = path.trim_start_matches('/').splitn(3, '/');
    match (segments.next(), segments.next(), segments.next()) {
        (Some(route @ ("status" | "download")), Some(_), None) => format!("/{}/:job_id", route),
        (Some("jobs"), Some(_), Some(action)) => format!("/jobs/:job_id/{}", action),
        _ => path.to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(request.uri().path());
    let start = Instant::now();

    let response = next.run(request).await;

    let labels = [
        ("method", method),
        ("path", path),
        ("status", response.status().as_u16().to_string()),
    ];
    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(start.elapsed().as_secs_f64());

    response
}
