use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::client::TranscribeApi;
use crate::error::TranscribeError;
use crate::job::{JobState, Transcript};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(600);

#[derive(Debug)]
pub enum WatchOutcome {
    /// Job reached COMPLETED; transcript attached when the service
    /// produced one and it could be fetched.
    Completed(Option<Transcript>),
    /// Caller cancelled the watch; the remote job keeps running
    /// un-awaited and is never polled again by this watcher.
    Cancelled,
}

/// Polls a submitted job to a terminal state on a fixed interval.
///
/// The first poll happens immediately after submission, then every
/// `interval`. The loop suspends between polls and gives up with
/// `WatchTimeout` once `max_wait` wall-clock time has passed.
#[derive(Debug, Clone)]
pub struct Watcher {
    interval: Duration,
    max_wait: Duration,
}

impl Default for Watcher {
    fn default() -> Self {
        Watcher {
            interval: DEFAULT_POLL_INTERVAL,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl Watcher {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Watcher { interval, max_wait }
    }

    /// Drive `job_name` to a terminal state.
    ///
    /// `cancel` resolving (sent or dropped) stops polling without an
    /// error. A transient `Unavailable` poll failure is retried on
    /// the next tick; any other client error is surfaced as-is.
    pub async fn watch(
        &self,
        client: &dyn TranscribeApi,
        job_name: &str,
        cancel: Option<oneshot::Receiver<()>>,
    ) -> Result<WatchOutcome, TranscribeError> {
        let deadline = Instant::now() + self.max_wait;
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel = cancel;

        loop {
            tokio::select! {
                biased;
                _ = async { cancel.as_mut().unwrap().await }, if cancel.is_some() => {
                    info!(job_name, "watch cancelled, leaving remote job un-awaited");
                    return Ok(WatchOutcome::Cancelled);
                }
                _ = sleep_until(deadline) => {
                    return Err(TranscribeError::WatchTimeout {
                        job_name: job_name.to_string(),
                    });
                }
                _ = ticker.tick() => {}
            }

            match client.job_status(job_name).await {
                Ok(status) => match status.state {
                    JobState::Completed => {
                        info!(job_name, "transcription job completed");
                        let transcript = match status.transcript_uri.as_deref() {
                            Some(uri) => match client.fetch_transcript(uri).await {
                                Ok(t) => t,
                                Err(TranscribeError::Unavailable(e)) => {
                                    warn!(job_name, "transcript fetch failed: {}", e);
                                    None
                                }
                                Err(e) => return Err(e),
                            },
                            None => None,
                        };
                        return Ok(WatchOutcome::Completed(transcript));
                    }
                    state if state.is_terminal() => {
                        return Err(TranscribeError::JobFailed {
                            job_name: job_name.to_string(),
                            state,
                        });
                    }
                    state => {
                        debug!(job_name, %state, "transcription job still running");
                    }
                },
                Err(TranscribeError::Unavailable(e)) => {
                    warn!(job_name, "status poll failed, retrying next tick: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::job::{JobStatus, StartJob};

    enum Step {
        State(JobState),
        Down,
    }

    struct ScriptedApi {
        steps: Mutex<Vec<Step>>,
        polls: AtomicUsize,
        transcript_uri: Option<String>,
    }

    impl ScriptedApi {
        fn new(steps: Vec<Step>) -> Self {
            ScriptedApi {
                steps: Mutex::new(steps),
                polls: AtomicUsize::new(0),
                transcript_uri: None,
            }
        }

        fn polls(&self) -> usize {
            self.polls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TranscribeApi for ScriptedApi {
        async fn start_job(&self, req: StartJob) -> Result<JobStatus, TranscribeError> {
            Ok(JobStatus {
                job_name: req.job_name,
                state: JobState::Submitted,
                transcript_uri: None,
            })
        }

        async fn job_status(&self, job_name: &str) -> Result<JobStatus, TranscribeError> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            let mut steps = self.steps.lock().unwrap();
            assert!(!steps.is_empty(), "polled past the scripted sequence");
            match steps.remove(0) {
                Step::State(state) => Ok(JobStatus {
                    job_name: job_name.to_string(),
                    state,
                    transcript_uri: self.transcript_uri.clone(),
                }),
                Step::Down => Err(TranscribeError::Unavailable(anyhow::anyhow!(
                    "connection refused"
                ))),
            }
        }

        async fn fetch_transcript(
            &self,
            _uri: &str,
        ) -> Result<Option<Transcript>, TranscribeError> {
            Ok(Some(Transcript {
                text: "scripted".to_string(),
            }))
        }
    }

    fn watcher() -> Watcher {
        Watcher::new(Duration::from_secs(5), Duration::from_secs(600))
    }

    #[tokio::test(start_paused = true)]
    async fn completes_after_third_poll() {
        let api = ScriptedApi::new(vec![
            Step::State(JobState::InProgress),
            Step::State(JobState::InProgress),
            Step::State(JobState::Completed),
        ]);

        let outcome = watcher().watch(&api, "job-1", None).await.unwrap();
        assert!(matches!(outcome, WatchOutcome::Completed(None)));
        assert_eq!(api.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_job_fetches_transcript() {
        let mut api = ScriptedApi::new(vec![Step::State(JobState::Completed)]);
        api.transcript_uri = Some("http://svc/transcripts/job-1".to_string());

        let outcome = watcher().watch(&api, "job-1", None).await.unwrap();
        match outcome {
            WatchOutcome::Completed(Some(t)) => assert_eq!(t.text, "scripted"),
            other => panic!("expected transcript, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_job_stops_after_second_poll() {
        let api = ScriptedApi::new(vec![
            Step::State(JobState::InProgress),
            Step::State(JobState::Failed),
        ]);

        let err = watcher().watch(&api, "job-2", None).await.unwrap_err();
        match err {
            TranscribeError::JobFailed { job_name, state } => {
                assert_eq!(job_name, "job-2");
                assert_eq!(state, JobState::Failed);
            }
            other => panic!("expected JobFailed, got {}", other),
        }
        assert_eq!(api.polls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_job_terminates_like_failed() {
        let api = ScriptedApi::new(vec![Step::State(JobState::Cancelled)]);
        let err = watcher().watch(&api, "job-3", None).await.unwrap_err();
        assert!(matches!(
            err,
            TranscribeError::JobFailed {
                state: JobState::Cancelled,
                ..
            }
        ));
        assert_eq!(api.polls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_outage_is_retried_next_tick() {
        let api = ScriptedApi::new(vec![
            Step::Down,
            Step::State(JobState::InProgress),
            Step::State(JobState::Completed),
        ]);

        let outcome = watcher().watch(&api, "job-4", None).await.unwrap();
        assert!(matches!(outcome, WatchOutcome::Completed(None)));
        assert_eq!(api.polls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_polling_without_error() {
        let api = ScriptedApi::new(vec![Step::State(JobState::InProgress)]);
        let (tx, rx) = oneshot::channel();
        tx.send(()).unwrap();

        // Cancel is already pending, so not a single poll happens.
        let outcome = watcher().watch(&api, "job-5", Some(rx)).await.unwrap();
        assert!(matches!(outcome, WatchOutcome::Cancelled));
        assert_eq!(api.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_cancel_handle_also_stops_polling() {
        let api = ScriptedApi::new(vec![Step::State(JobState::InProgress)]);
        let (tx, rx) = oneshot::channel::<()>();
        drop(tx);

        let outcome = watcher().watch(&api, "job-6", Some(rx)).await.unwrap();
        assert!(matches!(outcome, WatchOutcome::Cancelled));
        assert_eq!(api.polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_with_watch_timeout() {
        let api = ScriptedApi::new(vec![
            Step::State(JobState::InProgress),
            Step::State(JobState::InProgress),
            Step::State(JobState::InProgress),
        ]);

        let watcher = Watcher::new(Duration::from_secs(5), Duration::from_secs(12));
        let err = watcher.watch(&api, "job-7", None).await.unwrap_err();
        assert!(matches!(err, TranscribeError::WatchTimeout { .. }));
        // Polls at t=0s, 5s and 10s; the deadline fires at 12s.
        assert_eq!(api.polls(), 3);
    }
}
