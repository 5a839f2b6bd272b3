use std::fmt;

use crate::job::JobState;

#[derive(Debug)]
pub enum TranscribeError {
    /// The service rejected the submission (invalid parameters)
    Rejected(String),
    /// The service is unreachable; transient, retried by the watcher
    Unavailable(anyhow::Error),
    /// Unknown job name
    JobNotFound(String),
    /// Transcript payload could not be parsed
    TranscriptUnreadable(String),
    /// The job reached FAILED or CANCELLED
    JobFailed { job_name: String, state: JobState },
    /// The watcher gave up before the job reached a terminal state
    WatchTimeout { job_name: String },
}

impl fmt::Display for TranscribeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscribeError::Rejected(msg) => write!(f, "job submission rejected: {}", msg),
            TranscribeError::Unavailable(err) => {
                write!(f, "transcription service unavailable: {}", err)
            }
            TranscribeError::JobNotFound(job) => write!(f, "transcription job not found: {}", job),
            TranscribeError::TranscriptUnreadable(msg) => {
                write!(f, "transcript unreadable: {}", msg)
            }
            TranscribeError::JobFailed { job_name, state } => {
                write!(f, "transcription job {} terminated as {}", job_name, state)
            }
            TranscribeError::WatchTimeout { job_name } => {
                write!(f, "timed out waiting for transcription job {}", job_name)
            }
        }
    }
}

impl std::error::Error for TranscribeError {}
