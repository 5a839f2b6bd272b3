use serde::{Deserialize, Serialize};

/// Storage backend configuration for the media store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage
    Fs {
        #[serde(default = "default_fs_root")]
        root: String,
    },
    /// AWS S3 compatible storage
    S3 {
        /// S3 bucket name
        bucket: String,
        /// Root path within bucket
        #[serde(default = "default_s3_root")]
        root: String,
        #[serde(default)]
        region: Option<String>,
        /// Custom endpoint for S3-compatible services
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        access_key_id: Option<String>,
        #[serde(default)]
        secret_access_key: Option<String>,
        /// Disable credential auto-loading from the environment
        #[serde(default)]
        disable_config_load: bool,
        /// Base URL rendered into video listings, defaults to
        /// https://{bucket}.s3.amazonaws.com
        #[serde(default)]
        public_base_url: Option<String>,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Fs {
            root: default_fs_root(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            StorageConfig::Fs { root } => {
                if root.trim().is_empty() {
                    anyhow::bail!("storage root cannot be empty");
                }
            }
            StorageConfig::S3 { bucket, .. } => {
                if bucket.trim().is_empty() {
                    anyhow::bail!("s3 bucket cannot be empty");
                }
            }
        }
        Ok(())
    }
}

fn default_fs_root() -> String {
    "./media".to_string()
}

fn default_s3_root() -> String {
    "/".to_string()
}
