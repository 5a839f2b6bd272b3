use std::pin::Pin;

use anyhow::Result;
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use opendal::services;
use opendal::Operator;

use crate::config::StorageConfig;
use crate::error::StoreError;

/// Lazy, finite sequence of object chunks in arrival order
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StoreError>> + Send>>;

// Upper bound on a single chunk handed to relay consumers.
const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Gateway to the remote object store holding uploaded media.
///
/// All operations are idempotent and safe to retry.
#[derive(Clone)]
pub struct MediaStore {
    op: Operator,
    config: StorageConfig,
}

impl MediaStore {
    /// Build the store and verify the backend is reachable.
    pub async fn open(config: &StorageConfig) -> Result<Self> {
        let op = build_operator(config)?;
        match op.check().await {
            Ok(_) => tracing::info!("storage backend initialized and verified: {:?}", config),
            Err(e) => tracing::warn!(
                "storage backend initialized but connection test failed: {}, continuing anyway",
                e
            ),
        }
        Ok(MediaStore {
            op,
            config: config.clone(),
        })
    }

    /// Store bytes under key, overwriting any existing object.
    pub async fn put(&self, key: &str, bytes: Bytes) -> Result<(), StoreError> {
        self.op
            .write(key, bytes)
            .await
            .map_err(|e| StoreError::from_opendal(key, e))?;
        tracing::debug!(key, "object stored");
        Ok(())
    }

    /// Open a chunked reader over the object. The key is checked up
    /// front so an absent object fails before any chunk is produced.
    pub async fn reader(&self, key: &str) -> Result<(u64, ByteStream), StoreError> {
        let meta = self
            .op
            .stat(key)
            .await
            .map_err(|e| StoreError::from_opendal(key, e))?;
        let reader = self
            .op
            .reader_with(key)
            .chunk(READ_CHUNK_BYTES)
            .await
            .map_err(|e| StoreError::from_opendal(key, e))?;
        let stream = reader
            .into_bytes_stream(..)
            .await
            .map_err(|e| StoreError::from_opendal(key, e))?;
        let stream = stream.map(|item| item.map_err(|e| StoreError::Unavailable(e.into())));
        Ok((meta.content_length(), Box::pin(stream)))
    }

    /// Enumerate stored objects as (key, size) pairs. An empty store
    /// yields an empty vec, never an error.
    pub async fn list(&self, prefix: &str) -> Result<Vec<(String, u64)>, StoreError> {
        let entries = self
            .op
            .list(prefix)
            .await
            .map_err(|e| StoreError::from_opendal(prefix, e))?;
        Ok(entries
            .into_iter()
            .filter(|e| e.metadata().is_file())
            .map(|e| (e.path().to_string(), e.metadata().content_length()))
            .collect())
    }

    /// Public URL for a stored object, rendered into video listings.
    pub fn public_url(&self, key: &str) -> String {
        match &self.config {
            StorageConfig::Fs { .. } => crate::path::play_url(key),
            StorageConfig::S3 {
                bucket,
                public_base_url,
                ..
            } => match public_base_url {
                Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
                None => format!("https://{}.s3.amazonaws.com/{}", bucket, key),
            },
        }
    }
}

fn build_operator(config: &StorageConfig) -> Result<Operator> {
    match config {
        StorageConfig::Fs { root } => {
            tracing::info!("configuring filesystem storage with root: {}", root);
            let builder = services::Fs::default().root(root);
            Ok(Operator::new(builder)?.finish())
        }
        StorageConfig::S3 {
            bucket,
            root,
            region,
            endpoint,
            access_key_id,
            secret_access_key,
            disable_config_load,
            ..
        } => {
            tracing::info!(
                "configuring s3 storage with bucket: {}, region: {:?}",
                bucket,
                region
            );
            let mut builder = services::S3::default()
                .bucket(bucket)
                .root(root.trim_start_matches('/'));
            if let Some(region) = region {
                builder = builder.region(region);
            }
            if let Some(endpoint) = endpoint {
                builder = builder.endpoint(endpoint);
            }
            if let Some(access_key_id) = access_key_id {
                builder = builder.access_key_id(access_key_id);
            }
            if let Some(secret_access_key) = secret_access_key {
                builder = builder.secret_access_key(secret_access_key);
            }
            if *disable_config_load {
                builder = builder.disable_config_load();
            }
            Ok(Operator::new(builder)?.finish())
        }
    }
}
