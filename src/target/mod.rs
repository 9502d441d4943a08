//! Target module
//!
//! Reads tap messages line by line and routes records to one sink per
//! stream. The target owns the batch counters: when a stream's batch is
//! full its sink is flushed and any pending STATE is emitted once every
//! stream has been drained.
//!
//! # Overview
//!
//! - `SCHEMA` registers a stream. A changed schema finalizes the current
//!   object and starts a new sink for the stream.
//! - `RECORD` is handed to the stream's sink.
//! - `STATE` is held until preceding records are drained.
//! - Anything else is ignored.

mod types;

pub use types::{Message, StateOutput};

use crate::config::TargetConfig;
use crate::error::{Error, Result};
use crate::output::Destination;
use crate::sink::{BatchCounter, GcsSink, DEFAULT_MAX_BATCH_SIZE};
use crate::types::{Context, JsonValue, Record, WriteSummary};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// Per-stream sink and batch bookkeeping
#[derive(Debug)]
struct StreamSink {
    sink: GcsSink,
    schema: JsonValue,
    counter: BatchCounter,
    context: Context,
}

/// Routes tap messages to per-stream sinks
pub struct Target<W: Write> {
    /// Validated configuration shared by all sinks
    config: Arc<TargetConfig>,
    /// Destination override for all sinks
    destination: Option<Destination>,
    /// Active sinks by stream name
    streams: HashMap<String, StreamSink>,
    /// Records per batch
    max_batch_size: usize,
    /// Latest STATE not yet emitted
    pending_state: Option<JsonValue>,
    /// Where STATE messages are written
    output: W,
    /// Finalized objects
    summaries: Vec<WriteSummary>,
    /// Total records processed
    records_processed: usize,
}

impl<W: Write> Target<W> {
    /// Create a target writing STATE messages to `output`
    pub fn new(config: TargetConfig, output: W) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            destination: None,
            streams: HashMap::new(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            pending_state: None,
            output,
            summaries: Vec::new(),
            records_processed: 0,
        })
    }

    /// Write every stream to the given destination instead of GCS
    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Set the number of records per batch
    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Total records processed so far
    pub fn records_processed(&self) -> usize {
        self.records_processed
    }

    /// Names of streams with an active sink
    pub fn stream_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.streams.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Process every line of `reader`, then finalize all objects
    pub async fn run<R>(mut self, reader: R) -> Result<Vec<WriteSummary>>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        let mut line_number = 0usize;
        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            self.process_line(&line).await.map_err(|e| match e {
                Error::Protocol { message } => {
                    Error::protocol(format!("line {line_number}: {message}"))
                }
                other => other,
            })?;
        }
        self.finish().await
    }

    /// Process one input line
    pub async fn process_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let message = Message::parse(line)?;
        self.process_message(message).await
    }

    /// Process one parsed message
    pub async fn process_message(&mut self, message: Message) -> Result<()> {
        match message {
            Message::Schema { stream, schema, .. } => self.process_schema(stream, schema).await,
            Message::Record { stream, record, .. } => self.process_record(&stream, record).await,
            Message::State { value } => self.process_state(value),
            Message::Unsupported => {
                debug!("Ignoring unsupported message");
                Ok(())
            }
        }
    }

    async fn process_schema(&mut self, stream: String, schema: JsonValue) -> Result<()> {
        if let Some(existing) = self.streams.get(&stream) {
            if existing.schema == schema {
                debug!("Schema unchanged for stream {}", stream);
                return Ok(());
            }
            info!("Schema changed for stream {}, starting a new object", stream);
            if let Some(mut old) = self.streams.remove(&stream) {
                if let Some(summary) = old.sink.close().await? {
                    self.summaries.push(summary);
                }
            }
            self.emit_state_if_drained()?;
        } else {
            info!("Registered stream {}", stream);
        }

        let mut sink = GcsSink::new(Arc::clone(&self.config), stream.clone());
        if let Some(destination) = &self.destination {
            sink = sink.with_destination(destination.clone());
        }
        self.streams.insert(
            stream,
            StreamSink {
                sink,
                schema,
                counter: BatchCounter::new(self.max_batch_size),
                context: Context::new(),
            },
        );
        Ok(())
    }

    async fn process_record(&mut self, stream: &str, record: Record) -> Result<()> {
        let entry = self.streams.get_mut(stream).ok_or_else(|| {
            Error::protocol(format!("RECORD for stream '{stream}' received before its SCHEMA"))
        })?;

        entry.sink.process_record(record, &mut entry.context).await?;
        self.records_processed += 1;

        if entry.counter.increment() {
            debug!(
                "Draining stream {} after {} records",
                stream,
                entry.counter.count()
            );
            entry.sink.flush().await?;
            entry.counter.reset();
            entry.context.clear();
            self.emit_state_if_drained()?;
        }
        Ok(())
    }

    fn process_state(&mut self, value: JsonValue) -> Result<()> {
        self.pending_state = Some(value);
        self.emit_state_if_drained()
    }

    /// Emit pending state when no stream holds undrained records
    fn emit_state_if_drained(&mut self) -> Result<()> {
        if self.streams.values().all(|s| s.counter.is_empty()) {
            self.emit_state()?;
        }
        Ok(())
    }

    fn emit_state(&mut self) -> Result<()> {
        let Some(state) = self.pending_state.take() else {
            return Ok(());
        };
        let line = serde_json::to_string(&StateOutput::new(&state))?;
        writeln!(self.output, "{line}")?;
        self.output.flush()?;
        debug!("Emitted state");
        Ok(())
    }

    /// Finalize every object and emit the latest state
    pub async fn finish(mut self) -> Result<Vec<WriteSummary>> {
        let mut names: Vec<String> = self.streams.keys().cloned().collect();
        names.sort_unstable();

        for name in names {
            if let Some(mut entry) = self.streams.remove(&name) {
                match entry.sink.close().await? {
                    Some(summary) => self.summaries.push(summary),
                    None => warn!("No records received for stream {}", name),
                }
            }
        }

        self.emit_state()?;
        info!(
            "Processed {} records into {} objects",
            self.records_processed,
            self.summaries.len()
        );
        Ok(self.summaries)
    }
}
