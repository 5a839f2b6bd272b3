use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use chrono::Utc;
use http::StatusCode;
use tracing::info;

use crate::config::UploadMode;
use crate::error::AppError;
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new().route(api::path::UPLOAD, post(upload))
}

/// Accepts exactly one media payload in the `video` multipart field,
/// stores it under a fresh timestamped key, then triggers the
/// transcription cycle per the configured upload mode.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> crate::result::Result<Response> {
    let mut payload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("video") {
            let filename = field
                .file_name()
                .map(str::to_string)
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "upload.bin".to_string());
            let bytes = field.bytes().await?;
            payload = Some((filename, bytes));
        }
    }
    let (filename, bytes) = payload.ok_or(AppError::MissingPayload)?;

    let key = storage::media_key(&filename, Utc::now());
    let size = bytes.len();
    state.store.put(&key, bytes).await?;
    info!(key, size, "video uploaded");

    let (status, job_name) = match state.config.upload.mode {
        UploadMode::Off => (StatusCode::CREATED, None),
        UploadMode::Sync => {
            let service = state.transcriber()?;
            let job = service.submit(state.store.public_url(&key)).await?;
            service.wait(&job.job_name).await?;
            (StatusCode::CREATED, Some(job.job_name))
        }
        UploadMode::Async => {
            let service = state.transcriber()?;
            let job = service.submit(state.store.public_url(&key)).await?;
            service.watch_detached(job.job_name.clone());
            (StatusCode::ACCEPTED, Some(job.job_name))
        }
    };

    Ok((
        status,
        Json(api::response::Upload {
            video_name: key,
            job_name,
        }),
    )
        .into_response())
}
