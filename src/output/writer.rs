//! JSON lines object writer
//!
//! A [`JsonlWriter`] is an append-only stream into a single object. Data is
//! buffered and uploaded through the store's multipart API, so objects larger
//! than memory can be written one record at a time.

use crate::error::{Error, Result};
use crate::types::{Record, WriteSummary};
use object_store::buffered::BufWriter;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Serialize a record as compact JSON followed by a newline
pub fn encode_record(record: &Record) -> Result<Vec<u8>> {
    let mut line =
        serde_json::to_vec(record).map_err(|e| Error::serialization(e.to_string()))?;
    line.push(b'\n');
    Ok(line)
}

/// Append-only JSON lines writer bound to one object key
pub struct JsonlWriter {
    /// Buffered multipart upload
    inner: BufWriter,
    /// Object key
    key: String,
    /// Full object URI for logging
    uri: String,
    /// Number of records written
    records_written: usize,
    /// Number of bytes written
    bytes_written: usize,
}

impl JsonlWriter {
    /// Create a writer for `key` in `store`
    pub fn new(store: Arc<dyn ObjectStore>, key: &str, uri: impl Into<String>) -> Self {
        Self {
            inner: BufWriter::new(store, ObjectPath::from(key)),
            key: key.to_string(),
            uri: uri.into(),
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Append one record as a JSON line, returning the bytes written
    pub async fn write_record(&mut self, record: &Record) -> Result<usize> {
        let line = encode_record(record)?;
        self.inner
            .write_all(&line)
            .await
            .map_err(|e| Error::write(&self.key, e.to_string()))?;

        self.records_written += 1;
        self.bytes_written += line.len();
        Ok(line.len())
    }

    /// Flush buffered data towards the store
    pub async fn flush(&mut self) -> Result<()> {
        self.inner
            .flush()
            .await
            .map_err(|e| Error::write(&self.key, e.to_string()))
    }

    /// Complete the upload and finalize the object
    ///
    /// If completion fails the upload is aborted and the error returned.
    pub async fn close(mut self) -> Result<WriteSummary> {
        if let Err(e) = self.inner.shutdown().await {
            if let Err(abort_err) = self.inner.abort().await {
                tracing::warn!("Failed to abort upload of {}: {}", self.uri, abort_err);
            }
            return Err(Error::write(&self.key, e.to_string()));
        }

        Ok(WriteSummary {
            uri: self.uri,
            records: self.records_written,
            bytes: self.bytes_written,
        })
    }

    /// Object key this writer is bound to
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Full object URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Get the number of records written so far
    #[must_use]
    pub fn records_written(&self) -> usize {
        self.records_written
    }
}

impl std::fmt::Debug for JsonlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlWriter")
            .field("uri", &self.uri)
            .field("records_written", &self.records_written)
            .field("bytes_written", &self.bytes_written)
            .finish_non_exhaustive()
    }
}
