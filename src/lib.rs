// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Solidafy Target GCS
//!
//! Streams records from a tap into Google Cloud Storage as newline-delimited
//! JSON, one object per stream.
//!
//! ## Features
//!
//! - **BigQuery-safe field names**: every top-level key is cleaned before writing
//! - **Templated object keys**: `{stream}`, `{date}` and `{timestamp}` placeholders
//! - **Streaming uploads**: records are appended to a multipart upload as they arrive
//! - **Batch tracking**: STATE is emitted once preceding records are drained
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solidafy_target_gcs::{GcsSink, TargetConfig, Result};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = TargetConfig::new("my-bucket").with_key_prefix("raw/{date}");
//!     let mut sink = GcsSink::new(Arc::new(config), "users");
//!
//!     let record = serde_json::json!({"User Name": "Ada", "2fa%": 10});
//!     let record = record.as_object().cloned().unwrap_or_default();
//!     sink.process_record(record, &mut Default::default()).await?;
//!
//!     // Writes {"User_Name":"Ada","_2fa_avg":10} to gs://my-bucket/raw/<date>/users_<ts>.jsonl
//!     sink.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 Target (stdin → per-stream sinks)             │
//! │   SCHEMA → register   RECORD → sink   STATE → after drain     │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌───────────────┬──────────────┴──────┬───────────────────────┐
//! │    Naming     │      GcsSink        │       Output          │
//! ├───────────────┼─────────────────────┼───────────────────────┤
//! │ € $ % → _word │ Key (resolve once)  │ Destination (GCS)     │
//! │ other → _     │ Lazy write handle   │ JsonlWriter           │
//! │ ≤ 300 chars   │ Clean + append      │ Multipart upload      │
//! └───────────────┴─────────────────────┴───────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the target
pub mod error;

/// Common types and type aliases
pub mod types;

/// Field name cleaning
pub mod naming;

/// Key template interpolation
pub mod template;

/// Target configuration
pub mod config;

/// Object storage output
pub mod output;

/// Per-stream record sinks
pub mod sink;

/// Message routing
pub mod target;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::TargetConfig;
pub use error::{Error, Result};
pub use naming::sanitize_field_name;
pub use sink::{BatchCounter, GcsSink};
pub use target::Target;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
