pub mod client;
pub mod error;
pub mod job;
pub mod watcher;

pub use client::{HttpTranscribeClient, TranscribeApi};
pub use error::TranscribeError;
pub use job::{job_name, JobState, JobStatus, StartJob, Transcript};
pub use watcher::{WatchOutcome, Watcher};
