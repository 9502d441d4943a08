//! Output module
//!
//! Handles serializing records and writing them to object storage.
//!
//! # Overview
//!
//! This module provides:
//! - `Destination` - GCS or local-directory object store binding
//! - `JsonlWriter` - append-only JSON lines write handle for one object
//! - `encode_record` - compact JSON line serialization

mod cloud;
mod writer;

pub use cloud::Destination;
pub use writer::{encode_record, JsonlWriter};
