use std::sync::Arc;

use storage::MediaStore;

use crate::config::Config;
use crate::error::AppError;
use crate::relay::SessionManager;
use crate::transcription::TranscriptionService;

pub mod transcribe;
pub mod upload;
pub mod video;
pub mod ws;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: MediaStore,
    pub transcription: Option<TranscriptionService>,
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn transcriber(&self) -> Result<&TranscriptionService, AppError> {
        self.transcription
            .as_ref()
            .ok_or(AppError::TranscriptionDisabled)
    }
}
