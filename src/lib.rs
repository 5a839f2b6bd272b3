use std::future::Future;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info_span, Level};

use storage::MediaStore;

use crate::config::Config;
use crate::relay::SessionManager;
use crate::route::{transcribe, upload, video, ws, AppState};
use crate::transcription::TranscriptionService;

pub mod config;
pub mod log;

mod error;
mod relay;
mod result;
mod route;
mod transcription;

pub async fn server_up<F>(cfg: Config, listener: TcpListener, signal: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = MediaStore::open(&cfg.storage)
        .await
        .expect("failed to initialize storage backend");
    let transcription = cfg.transcribe.clone().map(TranscriptionService::new);

    let app_state = AppState {
        config: cfg.clone(),
        store,
        transcription,
        sessions: Arc::new(SessionManager::new()),
    };

    let app = Router::new()
        .merge(upload::route())
        .merge(video::route())
        .merge(transcribe::route())
        .merge(ws::route())
        .with_state(app_state)
        // Uploads are whole videos; the extractor default is far too small.
        .layer(DefaultBodyLimit::max(512 * 1024 * 1024))
        .layer(if cfg.http.cors {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        })
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "http_request",
                        uri = ?request.uri(),
                        method = ?request.method(),
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::INFO))
                .on_failure(tower_http::trace::DefaultOnFailure::new().level(Level::INFO)),
        );

    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .unwrap_or_else(|e| error!("Application error: {e}"));
}

/// Waits for a signal that requests a graceful shutdown, like
/// SIGTERM or Ctrl-C.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
