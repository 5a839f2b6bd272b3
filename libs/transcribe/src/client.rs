use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::error::TranscribeError;
use crate::job::{JobStatus, StartJob, Transcript};

/// Seam to the remote speech-to-text service. The watcher and the
/// server only ever talk through this trait, so tests can feed
/// scripted status sequences.
#[async_trait]
pub trait TranscribeApi: Send + Sync {
    async fn start_job(&self, req: StartJob) -> Result<JobStatus, TranscribeError>;
    async fn job_status(&self, job_name: &str) -> Result<JobStatus, TranscribeError>;
    async fn fetch_transcript(&self, uri: &str) -> Result<Option<Transcript>, TranscribeError>;
}

/// REST client for the transcription service:
/// POST {endpoint}/jobs, GET {endpoint}/jobs/{name}, transcript
/// payloads fetched from the absolute URI the service hands back.
#[derive(Clone, Debug)]
pub struct HttpTranscribeClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl HttpTranscribeClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        HttpTranscribeClient {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client: Client::builder()
                .connect_timeout(Duration::from_secs(3))
                .timeout(Duration::from_secs(15))
                .build()
                .expect("failed to build transcribe http client"),
        }
    }

    fn jobs_url(&self) -> String {
        format!("{}/jobs", self.endpoint)
    }

    fn job_url(&self, job_name: &str) -> String {
        format!("{}/jobs/{}", self.endpoint, job_name)
    }
}

#[async_trait]
impl TranscribeApi for HttpTranscribeClient {
    async fn start_job(&self, req: StartJob) -> Result<JobStatus, TranscribeError> {
        let response = self
            .client
            .post(self.jobs_url())
            .header("x-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| TranscribeError::Unavailable(e.into()))?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            warn!(job_name = %req.job_name, ?status, body, "job submission rejected");
            return Err(TranscribeError::Rejected(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Unavailable(anyhow::anyhow!(
                "service returned {}: {}",
                status,
                body
            )));
        }
        let job: JobStatus = response
            .json()
            .await
            .map_err(|e| TranscribeError::Unavailable(e.into()))?;
        debug!(job_name = %job.job_name, state = %job.state, "transcription job started");
        Ok(job)
    }

    async fn job_status(&self, job_name: &str) -> Result<JobStatus, TranscribeError> {
        let response = self
            .client
            .get(self.job_url(job_name))
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| TranscribeError::Unavailable(e.into()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(TranscribeError::JobNotFound(job_name.to_string())),
            status if status.is_success() => response
                .json()
                .await
                .map_err(|e| TranscribeError::Unavailable(e.into())),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(TranscribeError::Unavailable(anyhow::anyhow!(
                    "service returned {}: {}",
                    status,
                    body
                )))
            }
        }
    }

    async fn fetch_transcript(&self, uri: &str) -> Result<Option<Transcript>, TranscribeError> {
        let response = self
            .client
            .get(uri)
            .header("x-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| TranscribeError::Unavailable(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response
            .text()
            .await
            .map_err(|e| TranscribeError::Unavailable(e.into()))?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| TranscribeError::TranscriptUnreadable(e.to_string()))?;
        match Transcript::from_json(&value) {
            Some(transcript) => Ok(Some(transcript)),
            None => Err(TranscribeError::TranscriptUnreadable(
                "payload has no transcript text".to_string(),
            )),
        }
    }
}
