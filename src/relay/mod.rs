use std::collections::HashMap;

use tokio::sync::{oneshot, RwLock};
use tokio::task::JoinHandle;
use uuid::Uuid;

pub mod message;
pub mod producer;

pub use producer::RelayEvent;

/// A producer attached to one viewer connection.
pub struct SessionHandle {
    pub key: String,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn new(key: String, stop: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        SessionHandle { key, stop, task }
    }

    /// Release the producer. Safe whether or not it already ran to
    /// end-of-stream.
    pub fn stop(self) {
        let _ = self.stop.send(());
        self.task.abort();
    }
}

/// Registry of live stream sessions, keyed by connection id.
///
/// Owned by `AppState` and injected into every connection handler.
/// Invariant: at most one producer per session id; a second attach
/// for a live id is rejected.
#[derive(Default)]
pub struct SessionManager {
    sessions: RwLock<HashMap<Uuid, SessionHandle>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a producer for `id`. Fails fast when the session
    /// already has a live producer, handing the rejected handle back
    /// so the caller can stop it.
    pub async fn attach(&self, id: Uuid, handle: SessionHandle) -> Result<(), SessionHandle> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            return Err(handle);
        }
        sessions.insert(id, handle);
        Ok(())
    }

    pub async fn detach(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.write().await.remove(id)
    }

    pub async fn active(&self) -> usize {
        self.sessions.read().await.len()
    }
}
