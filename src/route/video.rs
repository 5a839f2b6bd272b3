use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::header;

use crate::error::AppError;
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new()
        .route(api::path::VIDEOS, get(videos))
        .route("/api/play/:key", get(play))
        .route("/api/video-info/:filename", get(video_info))
}

async fn videos(State(state): State<AppState>) -> crate::result::Result<Response> {
    let entries = state.store.list("").await?;
    if entries.is_empty() {
        return Ok(Json(api::response::Message {
            message: "No videos found".to_string(),
        })
        .into_response());
    }
    let videos: Vec<api::response::Video> = entries
        .into_iter()
        .map(|(key, _size)| api::response::Video {
            url: state.store.public_url(&key),
            key,
        })
        .collect();
    Ok(Json(videos).into_response())
}

/// Streams the stored object straight through, with Content-Type
/// derived from the file extension.
async fn play(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> crate::result::Result<Response> {
    if !storage::validate_key(&key) {
        return Err(AppError::NotFound(format!("no such video: {}", key)));
    }
    let (size, stream) = state.store.reader(&key).await?;
    Ok(Response::builder()
        .header(header::CONTENT_TYPE, storage::content_type(&key))
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(stream))?)
}

async fn video_info(Path(filename): Path<String>) -> Json<api::response::VideoInfo> {
    Json(api::response::VideoInfo {
        video_name: filename,
    })
}
