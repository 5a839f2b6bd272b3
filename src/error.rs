use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;
use storage::StoreError;
use transcribe::TranscribeError;

#[derive(Debug)]
pub enum AppError {
    /// No `video` field in the upload request
    MissingPayload,
    NotFound(String),
    /// Server started without a [transcribe] section
    TranscriptionDisabled,
    Store(StoreError),
    Transcribe(TranscribeError),
    InternalServerError(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            // 401 is the documented contract for a missing payload,
            // kept for client compatibility.
            AppError::MissingPayload => (
                StatusCode::UNAUTHORIZED,
                Json(api::response::Message {
                    message: "Please upload a video file".to_string(),
                }),
            )
                .into_response(),
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, Json(api::response::Error { error: what })).into_response()
            }
            AppError::Store(StoreError::NotFound(key)) => (
                StatusCode::NOT_FOUND,
                Json(api::response::Error {
                    error: format!("no such video: {}", key),
                }),
            )
                .into_response(),
            AppError::Store(err) => {
                tracing::error!("store error: {}", err);
                internal("Error accessing video storage")
            }
            AppError::Transcribe(TranscribeError::JobNotFound(job)) => (
                StatusCode::NOT_FOUND,
                Json(api::response::Error {
                    error: format!("no such transcription job: {}", job),
                }),
            )
                .into_response(),
            AppError::Transcribe(err) => {
                tracing::error!("transcription error: {}", err);
                internal("Error transcribing video")
            }
            AppError::TranscriptionDisabled => {
                tracing::error!("transcription requested but not configured");
                internal("Transcription is not configured")
            }
            AppError::InternalServerError(err) => {
                tracing::error!("internal error: {}", err);
                internal("Internal server error")
            }
        }
    }
}

fn internal(msg: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(api::response::Error {
            error: msg.to_string(),
        }),
    )
        .into_response()
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<TranscribeError> for AppError {
    fn from(err: TranscribeError) -> Self {
        AppError::Transcribe(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalServerError(err)
    }
}

impl From<axum::extract::multipart::MultipartError> for AppError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        AppError::InternalServerError(err.into())
    }
}

impl From<http::Error> for AppError {
    fn from(err: http::Error) -> Self {
        AppError::InternalServerError(err.into())
    }
}
