use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use http::StatusCode;
use serde_json::{json, Value};

use livevod::config::Config;

pub fn pick_port() -> u16 {
    portpicker::pick_unused_port().expect("failed to pick unused port")
}

#[derive(Clone, Default)]
struct MockState {
    addr: Arc<Mutex<Option<SocketAddr>>>,
    polls: Arc<Mutex<HashMap<String, usize>>>,
}

/// Handle onto a running speech-to-text service double: every job
/// completes on its second status poll and serves a fixed transcript
/// payload.
pub struct TranscribeMock {
    pub addr: SocketAddr,
    polls: Arc<Mutex<HashMap<String, usize>>>,
}

impl TranscribeMock {
    /// Jobs the service has accepted so far.
    pub fn job_count(&self) -> usize {
        self.polls.lock().unwrap().len()
    }
}

pub async fn serve_transcribe_mock() -> TranscribeMock {
    let state = MockState::default();
    let app = Router::new()
        .route("/jobs", post(start_job))
        .route("/jobs/:name", get(job_status))
        .route("/transcripts/:name", get(transcript))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", pick_port()))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    *state.addr.lock().unwrap() = Some(addr);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TranscribeMock {
        addr,
        polls: state.polls.clone(),
    }
}

/// Boot a full server on a picked port: fs storage in a fresh temp
/// dir, fast watcher polling against the mock, the given upload mode.
pub async fn server_with_mode(mode: &str) -> (SocketAddr, TranscribeMock) {
    let mock = serve_transcribe_mock().await;
    let media_root = std::env::temp_dir().join(format!("livevod-api-{}", pick_port()));
    let port = pick_port();

    let cfg: Config = toml::from_str(&format!(
        r#"
[http]
listen = "127.0.0.1:{port}"

[storage]
type = "fs"
root = "{root}"

[transcribe]
endpoint = "http://{transcribe_addr}"
api_key = "test-key"
poll_interval_ms = 50
max_wait_ms = 10000

[upload]
mode = "{mode}"
"#,
        port = port,
        root = media_root.display(),
        transcribe_addr = mock.addr,
        mode = mode,
    ))
    .expect("test config parses");
    cfg.validate().expect("test config is valid");

    let listener = tokio::net::TcpListener::bind(cfg.http.listen).await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(livevod::server_up(cfg, listener, std::future::pending()));
    (addr, mock)
}

pub fn upload_form(bytes: Vec<u8>, filename: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new().part(
        "video",
        reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()),
    )
}

async fn start_job(State(state): State<MockState>, Json(body): Json<Value>) -> impl IntoResponse {
    let job_name = body["job_name"].as_str().unwrap_or_default().to_string();
    if job_name.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "job_name"}))).into_response();
    }
    state.polls.lock().unwrap().insert(job_name.clone(), 0);
    Json(json!({ "job_name": job_name, "state": "SUBMITTED" })).into_response()
}

async fn job_status(State(state): State<MockState>, Path(name): Path<String>) -> impl IntoResponse {
    let mut polls = state.polls.lock().unwrap();
    let Some(count) = polls.get_mut(&name) else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "unknown job"}))).into_response();
    };
    *count += 1;
    if *count >= 2 {
        let addr = state.addr.lock().unwrap().expect("mock address set");
        Json(json!({
            "job_name": name,
            "state": "COMPLETED",
            "transcript_uri": format!("http://{}/transcripts/{}", addr, name),
        }))
        .into_response()
    } else {
        Json(json!({ "job_name": name, "state": "IN_PROGRESS" })).into_response()
    }
}

async fn transcript(Path(_name): Path<String>) -> Json<Value> {
    Json(json!({ "text": "mock transcript" }))
}
