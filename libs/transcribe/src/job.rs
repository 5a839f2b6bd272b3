use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Remote job lifecycle. COMPLETED, FAILED and CANCELLED are
/// terminal; the watcher never polls past them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Submitted,
    Queued,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Submitted => "SUBMITTED",
            JobState::Queued => "QUEUED",
            JobState::InProgress => "IN_PROGRESS",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    pub job_name: String,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_uri: Option<String>,
}

/// Submission parameters for a new transcription job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJob {
    pub job_name: String,
    pub media_uri: String,
    pub language_code: String,
    pub sample_rate_hertz: u32,
    pub media_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
}

impl Transcript {
    /// Accepts either a flat `{"text": ...}` payload or the
    /// AWS-style `{"results": {"transcripts": [{"transcript": ...}]}}`.
    pub fn from_json(value: &serde_json::Value) -> Option<Transcript> {
        if let Some(text) = value.get("text").and_then(|t| t.as_str()) {
            return Some(Transcript {
                text: text.to_string(),
            });
        }
        let text = value
            .get("results")?
            .get("transcripts")?
            .get(0)?
            .get("transcript")?
            .as_str()?;
        Some(Transcript {
            text: text.to_string(),
        })
    }
}

/// Unique job name per invocation, collision-free within the
/// process lifetime.
pub fn job_name(now: DateTime<Utc>) -> String {
    format!("transcription-{}", now.timestamp_millis())
}
