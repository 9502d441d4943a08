//! Object storage destinations (GCS, local filesystem)

use super::writer::JsonlWriter;
use crate::config::TargetConfig;
use crate::error::{Error, Result};
use crate::types::OutputFormat;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::ObjectStore;
use std::path::Path;
use std::sync::Arc;

/// Storage destination that objects are written into
#[derive(Debug, Clone)]
pub struct Destination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Bucket name, or root directory for local destinations
    bucket: String,
    /// URL scheme for URIs and logging
    scheme: String,
}

impl Destination {
    /// Create a GCS destination from target configuration
    pub fn from_config(config: &TargetConfig) -> Result<Self> {
        Self::gcs(&config.bucket_name, config.credentials_file.as_deref())
    }

    /// Create a GCS destination
    ///
    /// Authenticates with the given service-account key file when present,
    /// otherwise with whatever the `GOOGLE_*` environment provides.
    pub fn gcs(bucket: &str, credentials_file: Option<&Path>) -> Result<Self> {
        if bucket.trim().is_empty() {
            return Err(Error::missing_field("bucket_name"));
        }

        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(bucket);

        if let Some(path) = credentials_file {
            if !path.exists() {
                return Err(Error::config(format!(
                    "Credentials file not found: {}",
                    path.display()
                )));
            }
            builder = builder.with_service_account_path(path.to_string_lossy());
        }

        let store = builder
            .build()
            .map_err(|e| Error::connection(format!("Failed to create GCS client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: bucket.to_string(),
            scheme: "gs".to_string(),
        })
    }

    /// Create a destination rooted at a local directory
    pub fn local(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Create directory if it doesn't exist
        std::fs::create_dir_all(path).map_err(|e| {
            Error::config(format!("Failed to create directory {}: {e}", path.display()))
        })?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            bucket: path.display().to_string().trim_end_matches('/').to_string(),
            scheme: "file".to_string(),
        })
    }

    /// Wrap an existing object store
    pub fn from_store(
        store: Arc<dyn ObjectStore>,
        scheme: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            scheme: scheme.into(),
        }
    }

    /// Get the scheme (gs, file, ...)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get the bucket name (or local root)
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Get the underlying object store
    pub fn store(&self) -> Arc<dyn ObjectStore> {
        Arc::clone(&self.store)
    }

    /// Full URI of an object key, e.g. `gs://bucket/key`
    pub fn uri(&self, key: &str) -> String {
        format!("{}://{}/{key}", self.scheme, self.bucket)
    }

    /// Open a write handle for an object key
    ///
    /// Nothing is sent to the store until data is flushed or the handle is
    /// closed.
    pub fn open_writer(&self, key: &str, format: OutputFormat) -> JsonlWriter {
        match format {
            OutputFormat::Jsonl => JsonlWriter::new(self.store(), key, self.uri(key)),
        }
    }
}
