use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;
use uuid::Uuid;

use crate::relay::message::{ClientEvent, ServerEvent};
use crate::relay::{producer, RelayEvent, SessionHandle};
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new().route(api::path::WS, get(ws_handler))
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

/// One session per connection. The socket loop multiplexes viewer
/// commands with the producer's event stream; the server closes the
/// connection at end-of-stream or on error.
async fn handle_socket(state: AppState, mut socket: WebSocket) {
    let session_id = Uuid::new_v4();
    debug!(%session_id, "viewer connected");

    let mut active: Option<mpsc::Receiver<RelayEvent>> = None;
    loop {
        tokio::select! {
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(ClientEvent::StartStreaming { filename }) => {
                            match start_streaming(&state, session_id, &filename).await {
                                Ok(rx) => active = Some(rx),
                                Err(error) => {
                                    let _ = send_event(&mut socket, &ServerEvent::Error { error }).await;
                                }
                            }
                        }
                        Ok(ClientEvent::StopStreaming) => {
                            if let Some(handle) = state.sessions.detach(&session_id).await {
                                handle.stop();
                            }
                            active = None;
                        }
                        Err(e) => {
                            let error = format!("unrecognized event: {}", e);
                            let _ = send_event(&mut socket, &ServerEvent::Error { error }).await;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(%session_id, "socket error: {}", e);
                    break;
                }
            },
            event = async { active.as_mut().unwrap().recv().await }, if active.is_some() => {
                match event {
                    Some(RelayEvent::Chunk(bytes)) => {
                        if socket.send(Message::Binary(bytes.to_vec())).await.is_err() {
                            break;
                        }
                    }
                    Some(RelayEvent::End) => {
                        let handle = state.sessions.detach(&session_id).await;
                        active = None;
                        if let Some(handle) = handle {
                            finish_stream(&state, &mut socket, &handle.key).await;
                        }
                        break;
                    }
                    Some(RelayEvent::Error(error)) => {
                        let _ = send_event(&mut socket, &ServerEvent::Error { error }).await;
                        if let Some(handle) = state.sessions.detach(&session_id).await {
                            handle.stop();
                        }
                        break;
                    }
                    // Producer gone without a final event; treat as disconnect.
                    None => break,
                }
            }
        }
    }

    // Disconnect or explicit close: synchronously release whatever
    // producer is still attached.
    if let Some(handle) = state.sessions.detach(&session_id).await {
        handle.stop();
    }
    let _ = socket.send(Message::Close(None)).await;
    debug!(%session_id, "viewer disconnected");
}

/// Attach a producer for `filename` to this session. Fails fast when
/// the session already has a live producer.
async fn start_streaming(
    state: &AppState,
    session_id: Uuid,
    filename: &str,
) -> Result<mpsc::Receiver<RelayEvent>, String> {
    if !storage::validate_key(filename) {
        return Err(format!("invalid video key: {}", filename));
    }
    debug!(%session_id, filename, "start streaming");

    let (tx, rx) = mpsc::channel(16);
    let (stop_tx, stop_rx) = oneshot::channel();
    let task = producer::spawn(
        state.store.clone(),
        filename.to_string(),
        state.config.relay.policy,
        state.config.relay.max_buffer_bytes,
        tx,
        stop_rx,
    );

    let handle = SessionHandle::new(filename.to_string(), stop_tx, task);
    if let Err(rejected) = state.sessions.attach(session_id, handle).await {
        rejected.stop();
        return Err("session already has a live stream attached".to_string());
    }
    Ok(rx)
}

/// End-of-stream: report it, then submit a transcription job and
/// await its terminal outcome before the connection closes. A viewer
/// disconnecting mid-wait drops the watch; the remote job keeps
/// running un-awaited but the polling loop here dies with us.
async fn finish_stream(state: &AppState, socket: &mut WebSocket, key: &str) {
    let _ = send_event(
        socket,
        &ServerEvent::End {
            key: key.to_string(),
        },
    )
    .await;

    let transcription = run_transcription(state, key);
    tokio::pin!(transcription);
    let outcome = loop {
        tokio::select! {
            outcome = &mut transcription => break Some(outcome),
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break None,
                // Ignore viewer chatter while the job finishes.
                Some(Ok(_)) => {}
            }
        }
    };

    match outcome {
        Some(Ok(event)) => {
            let _ = send_event(socket, &event).await;
        }
        Some(Err(e)) => {
            debug!(key, "transcription after stream failed: {:?}", e);
            let _ = send_event(
                socket,
                &ServerEvent::Error {
                    error: "Error transcribing video".to_string(),
                },
            )
            .await;
        }
        None => debug!(key, "viewer left before transcription finished"),
    }
}

async fn run_transcription(state: &AppState, key: &str) -> crate::result::Result<ServerEvent> {
    let service = state.transcriber()?;
    let job = service.submit(state.store.public_url(key)).await?;
    let transcript = service.wait(&job.job_name).await?;
    Ok(ServerEvent::Transcription {
        job_name: job.job_name,
        status: transcribe::JobState::Completed.to_string(),
        text: transcript.map(|t| t.text),
    })
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), axum::Error> {
    let text = serde_json::to_string(event).expect("server event serializes");
    socket.send(Message::Text(text)).await
}
