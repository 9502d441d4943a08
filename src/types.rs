//! Common types used throughout Solidafy Target GCS
//!
//! This module contains shared type definitions and type aliases
//! used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single record received from the upstream source, keyed by field name
pub type Record = JsonObject;

/// Opaque per-batch bookkeeping passed alongside each record
pub type Context = JsonObject;

// ============================================================================
// Output Format
// ============================================================================

/// Serialization format of destination objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Newline-delimited JSON, one object per line
    #[default]
    Jsonl,
}

impl OutputFormat {
    /// File extension used in default object names
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ============================================================================
// Write Summary
// ============================================================================

/// Result of finalizing a destination object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteSummary {
    /// Full URI of the written object (e.g., `gs://bucket/key`)
    pub uri: String,
    /// Number of records written
    pub records: usize,
    /// Number of bytes written
    pub bytes: usize,
}
