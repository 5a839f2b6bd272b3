use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use transcribe::{
    HttpTranscribeClient, JobStatus, StartJob, TranscribeApi, TranscribeError, Transcript,
    WatchOutcome, Watcher,
};

use crate::config::TranscribeConfig;

/// Submission + watch glue over the transcribe client, carrying the
/// configured job parameters.
#[derive(Clone)]
pub struct TranscriptionService {
    client: Arc<dyn TranscribeApi>,
    watcher: Watcher,
    config: TranscribeConfig,
}

impl TranscriptionService {
    pub fn new(config: TranscribeConfig) -> Self {
        let client = Arc::new(HttpTranscribeClient::new(
            config.endpoint.clone(),
            config.api_key.clone(),
        ));
        let watcher = Watcher::new(config.poll_interval(), config.max_wait());
        TranscriptionService {
            client,
            watcher,
            config,
        }
    }

    /// Submit a job for a stored media object.
    pub async fn submit(&self, media_uri: String) -> Result<JobStatus, TranscribeError> {
        let req = StartJob {
            job_name: transcribe::job_name(Utc::now()),
            media_uri,
            language_code: self.config.language_code.clone(),
            sample_rate_hertz: self.config.sample_rate_hertz,
            media_format: self.config.media_format.clone(),
        };
        self.client.start_job(req).await
    }

    /// Await the job's terminal outcome. Callers that need to abort
    /// simply drop this future; the bounded watcher does the rest.
    pub async fn wait(&self, job_name: &str) -> Result<Option<Transcript>, TranscribeError> {
        match self
            .watcher
            .watch(self.client.as_ref(), job_name, None)
            .await?
        {
            WatchOutcome::Completed(transcript) => Ok(transcript),
            WatchOutcome::Cancelled => Ok(None),
        }
    }

    /// Run the watch cycle in the background; the outcome is logged,
    /// clients poll the status endpoint instead of waiting.
    pub fn watch_detached(&self, job_name: String) {
        let service = self.clone();
        tokio::spawn(async move {
            match service.wait(&job_name).await {
                Ok(_) => info!(job_name, "detached transcription completed"),
                Err(e) => warn!(job_name, "detached transcription failed: {}", e),
            }
        });
    }

    pub async fn status(&self, job_name: &str) -> Result<JobStatus, TranscribeError> {
        self.client.job_status(job_name).await
    }
}
