use serde::{Deserialize, Serialize};

/// Events a viewer sends over the push channel
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientEvent {
    StartStreaming { filename: String },
    StopStreaming,
}

/// Events the server sends back. Chunk payloads travel as binary
/// frames; these are the text frames around them.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerEvent {
    End {
        key: String,
    },
    Error {
        error: String,
    },
    Transcription {
        job_name: String,
        status: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
}
