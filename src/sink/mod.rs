//! Sink module
//!
//! Writes the records of one stream into a destination object.
//!
//! # Overview
//!
//! The sink module provides:
//! - `GcsSink` - key derivation, lazy write handle, per-record cleaning
//! - `BatchCounter` - batch size tracking for the orchestrator
//! - Key helpers used to derive object names from templates

mod batch;
mod gcs;
mod key;

pub use batch::{BatchCounter, DEFAULT_MAX_BATCH_SIZE};
pub use gcs::{GcsSink, TRANSFORMATION_TIMESTAMP_FIELD};
pub use key::{
    extraction_timestamp, format_date, prefixed_key, render_key_name, transformation_timestamp,
};

#[cfg(test)]
mod tests;
