//! Message types read by the target

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use serde::{Deserialize, Serialize};

/// A single message from the upstream tap, one per input line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Declares (or redeclares) the schema of a stream
    Schema {
        stream: String,
        schema: JsonValue,
        #[serde(default)]
        key_properties: Vec<String>,
    },

    /// One record of a stream
    Record {
        stream: String,
        record: Record,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time_extracted: Option<String>,
    },

    /// Opaque bookmark to hand back once preceding records are persisted
    State { value: JsonValue },

    /// Any other message type (ACTIVATE_VERSION, BATCH, ...)
    #[serde(other)]
    Unsupported,
}

impl Message {
    /// Parse a message from one input line
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| Error::protocol(format!("Invalid message: {e}")))
    }
}

/// STATE message emitted on stdout after persisting a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateOutput<'a> {
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub value: &'a JsonValue,
}

impl<'a> StateOutput<'a> {
    /// Wrap a state value
    pub fn new(value: &'a JsonValue) -> Self {
        Self {
            message_type: "STATE",
            value,
        }
    }
}
