use std::time::Duration;
use std::{env, fs, net::SocketAddr, str::FromStr};

use serde::{Deserialize, Serialize};
use storage::StorageConfig;

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub transcribe: Option<TranscribeConfig>,
    #[serde(default)]
    pub upload: Upload,
    #[serde(default)]
    pub relay: Relay,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Http {
    #[serde(default = "default_http_listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeConfig {
    /// Base URL of the speech-to-text service
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_language_code")]
    pub language_code: String,
    #[serde(default = "default_sample_rate_hertz")]
    pub sample_rate_hertz: u32,
    #[serde(default = "default_media_format")]
    pub media_format: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_wait_ms")]
    pub max_wait_ms: u64,
}

impl TranscribeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Upload {
    #[serde(default)]
    pub mode: UploadMode,
}

/// Scheduling of the transcription cycle an upload triggers
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// Reply 201 after the full watcher cycle finished
    #[default]
    Sync,
    /// Reply 202 immediately, job runs detached
    Async,
    /// Store only, never transcribe on upload
    Off,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relay {
    #[serde(default)]
    pub policy: RelayPolicy,
    #[serde(default = "default_max_buffer_bytes")]
    pub max_buffer_bytes: usize,
}

/// Chunk forwarding policy of the streaming relay.
///
/// `Accumulate` re-sends the whole buffer so far on every chunk,
/// which costs O(n^2) bytes over the connection but lets trivial
/// clients treat each frame as the complete prefix of the file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayPolicy {
    #[default]
    Chunk,
    Accumulate,
}

impl Default for Http {
    fn default() -> Self {
        Self {
            listen: default_http_listen(),
            cors: Default::default(),
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self {
            policy: Default::default(),
            max_buffer_bytes: default_max_buffer_bytes(),
        }
    }
}

fn default_http_listen() -> SocketAddr {
    SocketAddr::from_str(&format!(
        "0.0.0.0:{}",
        env::var("PORT").unwrap_or(String::from("3000"))
    ))
    .expect("invalid listen address")
}

fn default_log_level() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    })
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_sample_rate_hertz() -> u32 {
    44_100
}

fn default_media_format() -> String {
    "webm".to_string()
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_max_wait_ms() -> u64 {
    600_000
}

fn default_max_buffer_bytes() -> usize {
    64 * 1024 * 1024
}

impl Config {
    pub fn parse(path: Option<String>) -> Self {
        let result = fs::read_to_string(path.unwrap_or(String::from("livevod.toml")))
            .or(fs::read_to_string("/etc/livevod/livevod.toml"))
            .unwrap_or("".to_string());
        toml::from_str(result.as_str()).expect("config parse error")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.storage
            .validate()
            .map_err(|e| anyhow::anyhow!("storage config error: {}", e))?;

        if self.upload.mode != UploadMode::Off && self.transcribe.is_none() {
            anyhow::bail!(
                "upload.mode is {:?} but no [transcribe] section is configured",
                self.upload.mode
            );
        }
        if let Some(t) = &self.transcribe {
            if t.endpoint.trim().is_empty() {
                anyhow::bail!("transcribe.endpoint cannot be empty");
            }
            if t.api_key.trim().is_empty() {
                anyhow::bail!("transcribe.api_key cannot be empty");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.upload.mode, UploadMode::Sync);
        assert_eq!(cfg.relay.policy, RelayPolicy::Chunk);
        assert!(cfg.transcribe.is_none());
    }

    #[test]
    fn sync_mode_without_transcribe_section_is_rejected() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn off_mode_without_transcribe_section_is_accepted() {
        let cfg: Config = toml::from_str(
            r#"
[upload]
mode = "off"
"#,
        )
        .unwrap();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn transcribe_section_parses_with_defaults() {
        let cfg: Config = toml::from_str(
            r#"
[transcribe]
endpoint = "https://stt.example.com"
api_key = "secret"

[relay]
policy = "accumulate"
"#,
        )
        .unwrap();
        let t = cfg.transcribe.unwrap();
        assert_eq!(t.language_code, "en-US");
        assert_eq!(t.sample_rate_hertz, 44_100);
        assert_eq!(t.media_format, "webm");
        assert_eq!(t.poll_interval(), Duration::from_secs(5));
        assert_eq!(cfg.relay.policy, RelayPolicy::Accumulate);
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let cfg: Config = toml::from_str(
            r#"
[transcribe]
endpoint = "https://stt.example.com"
api_key = ""
"#,
        )
        .unwrap();
        assert!(cfg.validate().is_err());
    }
}
