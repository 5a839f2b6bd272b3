use bytes::Bytes;
use futures_util::StreamExt;
use storage::MediaStore;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::RelayPolicy;

/// What the producer pushes to the connection loop. One linear event
/// stream per session instead of separate data/end/error callbacks.
#[derive(Debug)]
pub enum RelayEvent {
    /// Next frame to forward: the new chunk (`Chunk` policy) or the
    /// whole accumulated buffer so far (`Accumulate` policy)
    Chunk(Bytes),
    End,
    Error(String),
}

/// Spawn the byte producer for one session: pulls object-store
/// chunks in order and forwards them until end-of-stream, a
/// transport error, or a stop signal. Resolution of `stop` (sent or
/// dropped) detaches quietly; no `End` event is emitted, so the
/// session never triggers transcription.
pub fn spawn(
    store: MediaStore,
    key: String,
    policy: RelayPolicy,
    max_buffer_bytes: usize,
    tx: mpsc::Sender<RelayEvent>,
    stop: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(run(store, key, policy, max_buffer_bytes, tx, stop))
}

async fn run(
    store: MediaStore,
    key: String,
    policy: RelayPolicy,
    max_buffer_bytes: usize,
    tx: mpsc::Sender<RelayEvent>,
    mut stop: oneshot::Receiver<()>,
) {
    let (size, mut chunks) = match store.reader(&key).await {
        Ok(reader) => reader,
        Err(e) => {
            let _ = tx.send(RelayEvent::Error(e.to_string())).await;
            return;
        }
    };
    debug!(key, size, ?policy, "producer attached");

    let mut accumulated: Vec<u8> = Vec::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = &mut stop => {
                debug!(key, "producer detached before end-of-stream");
                return;
            }
            next = chunks.next() => next,
        };

        match next {
            Some(Ok(bytes)) => {
                let frame = match policy {
                    RelayPolicy::Chunk => bytes,
                    RelayPolicy::Accumulate => {
                        accumulated.extend_from_slice(&bytes);
                        if accumulated.len() > max_buffer_bytes {
                            let error = format!(
                                "accumulated buffer exceeded {} bytes",
                                max_buffer_bytes
                            );
                            forward(&tx, &mut stop, RelayEvent::Error(error)).await;
                            return;
                        }
                        Bytes::copy_from_slice(&accumulated)
                    }
                };
                // Viewer gone, nothing left to forward to.
                if !forward(&tx, &mut stop, RelayEvent::Chunk(frame)).await {
                    return;
                }
            }
            Some(Err(e)) => {
                warn!(key, "stream error from object store: {}", e);
                forward(&tx, &mut stop, RelayEvent::Error(e.to_string())).await;
                return;
            }
            None => {
                debug!(key, "end of stream");
                forward(&tx, &mut stop, RelayEvent::End).await;
                return;
            }
        }
    }
}

/// Deliver an event unless the viewer is gone or a stop arrives
/// while the channel is full. A late stop still wins over an
/// undelivered event, so a detached session never observes End.
async fn forward(
    tx: &mpsc::Sender<RelayEvent>,
    stop: &mut oneshot::Receiver<()>,
    event: RelayEvent,
) -> bool {
    tokio::select! {
        biased;
        _ = &mut *stop => false,
        res = tx.send(event) => res.is_ok(),
    }
}
