//! Worker error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use vcluster_media::MediaError;
use vcluster_service::ErrorResponse;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid frame image: {0}")]
    InvalidImage(String),

    #[error("Processing failed: {0}")]
    ProcessingFailed(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),
}

impl WorkerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// The client sent a frame that does not decode.
    pub fn invalid_image(err: MediaError) -> Self {
        Self::InvalidImage(err.to_string())
    }

    pub fn processing_failed(msg: impl Into<String>) -> Self {
        Self::ProcessingFailed(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            WorkerError::InvalidImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WorkerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            WorkerError::InvalidImage(_) => {
                ErrorResponse::new(self.to_string()).with_code("invalid_image")
            }
            _ => ErrorResponse::internal(self.to_string()),
        };
        body.into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::error::{ParameterError, ParameterErrorKind};
    use image::ImageError;

    fn image_error() -> MediaError {
        MediaError::Image(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )))
    }

    #[test]
    fn test_invalid_image_is_client_error() {
        let response = WorkerError::invalid_image(image_error()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_media_image_error_is_server_error() {
        let response = WorkerError::from(image_error()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
