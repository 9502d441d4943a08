//! GCS record sink
//!
//! Streams the records of one stream into a single JSON lines object. The
//! object key is derived once, on first use, and the write handle is opened
//! lazily on the first record.

use super::key::{render_key_name, transformation_timestamp};
use crate::config::TargetConfig;
use crate::error::Result;
use crate::naming::sanitize_record_keys;
use crate::output::{Destination, JsonlWriter};
use crate::types::{Context, JsonValue, OutputFormat, Record, WriteSummary};
use chrono::{Local, Utc};
use std::sync::Arc;
use tracing::{debug, info};

/// Field added to every record when `transformation_timestamp` is enabled
pub const TRANSFORMATION_TIMESTAMP_FIELD: &str = "transformation_timestamp";

/// Sink writing one stream's records to an object store
pub struct GcsSink {
    /// Target configuration
    config: Arc<TargetConfig>,
    /// Name of the stream this sink writes
    stream_name: String,
    /// Destination override; built from config when absent
    destination: Option<Destination>,
    /// Cached object key
    key_name: Option<String>,
    /// Open write handle
    write_handle: Option<JsonlWriter>,
}

impl GcsSink {
    /// Create a sink for `stream_name` writing to the configured GCS bucket
    pub fn new(config: Arc<TargetConfig>, stream_name: impl Into<String>) -> Self {
        Self {
            config,
            stream_name: stream_name.into(),
            destination: None,
            key_name: None,
            write_handle: None,
        }
    }

    /// Write to the given destination instead of the configured bucket
    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Name of the stream this sink writes
    pub fn stream_name(&self) -> &str {
        &self.stream_name
    }

    /// Output format of the destination object
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::Jsonl
    }

    /// Whether a write handle has been opened
    pub fn is_open(&self) -> bool {
        self.write_handle.is_some()
    }

    /// Records written to the current handle
    pub fn records_written(&self) -> usize {
        self.write_handle
            .as_ref()
            .map_or(0, JsonlWriter::records_written)
    }

    /// Object key for this sink
    ///
    /// Resolved on first call and cached for the lifetime of the sink, so
    /// later calls return the same key even if the clock moved on.
    pub fn key_name(&mut self) -> Result<&str> {
        let key = match self.key_name.take() {
            Some(key) => key,
            None => {
                let key = render_key_name(
                    &self.config,
                    &self.stream_name,
                    self.output_format(),
                    &Local::now(),
                )?;
                debug!("Resolved key for stream {}: {}", self.stream_name, key);
                key
            }
        };
        Ok(self.key_name.insert(key).as_str())
    }

    /// Open the write handle if it isn't open yet
    ///
    /// Never opens a second handle for the same sink.
    pub async fn ensure_write_handle(&mut self) -> Result<&mut JsonlWriter> {
        let handle = match self.write_handle.take() {
            Some(handle) => handle,
            None => self.open_write_handle()?,
        };
        Ok(self.write_handle.insert(handle))
    }

    fn open_write_handle(&mut self) -> Result<JsonlWriter> {
        let destination = match self.destination.take() {
            Some(destination) => destination,
            None => Destination::from_config(&self.config)?,
        };
        let destination = self.destination.insert(destination).clone();
        let format = self.output_format();
        let key = self.key_name()?;

        let handle = destination.open_writer(key, format);
        info!(
            "Opened {} for stream {}",
            handle.uri(),
            self.stream_name
        );
        Ok(handle)
    }

    /// Clean and append one record to the destination object
    ///
    /// The context is caller bookkeeping and is not interpreted here.
    pub async fn process_record(&mut self, mut record: Record, _context: &mut Context) -> Result<()> {
        if self.config.transformation_timestamp {
            record.insert(
                TRANSFORMATION_TIMESTAMP_FIELD.to_string(),
                JsonValue::String(transformation_timestamp(&Utc::now())),
            );
        }

        let clean = sanitize_record_keys(record);
        self.ensure_write_handle().await?.write_record(&clean).await?;
        Ok(())
    }

    /// Push buffered data towards the store
    pub async fn flush(&mut self) -> Result<()> {
        match self.write_handle.as_mut() {
            Some(handle) => handle.flush().await,
            None => Ok(()),
        }
    }

    /// Finalize the destination object
    ///
    /// Returns `None` when no record was ever written.
    pub async fn close(&mut self) -> Result<Option<WriteSummary>> {
        let Some(handle) = self.write_handle.take() else {
            return Ok(None);
        };
        let summary = handle.close().await?;
        info!(
            "Wrote {} records ({} bytes) to {}",
            summary.records, summary.bytes, summary.uri
        );
        Ok(Some(summary))
    }
}

impl std::fmt::Debug for GcsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcsSink")
            .field("stream_name", &self.stream_name)
            .field("key_name", &self.key_name)
            .field("write_handle", &self.write_handle)
            .finish_non_exhaustive()
    }
}
