use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};

use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new()
        .route("/api/transcribe/status/:job_name", get(status))
        .route("/api/transcribe/:filename", get(trigger))
}

/// Submit a transcription job for an already-stored video. The watch
/// cycle runs detached; poll the status endpoint for progress.
async fn trigger(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> crate::result::Result<Json<api::response::Transcribe>> {
    let service = state.transcriber()?;
    let job = service.submit(state.store.public_url(&filename)).await?;
    service.watch_detached(job.job_name.clone());
    Ok(Json(api::response::Transcribe {
        job_name: job.job_name,
        status: job.state.to_string(),
    }))
}

async fn status(
    State(state): State<AppState>,
    Path(job_name): Path<String>,
) -> crate::result::Result<Json<api::response::Transcribe>> {
    let job = state.transcriber()?.status(&job_name).await?;
    Ok(Json(api::response::Transcribe {
        job_name: job.job_name,
        status: job.state.to_string(),
    }))
}
