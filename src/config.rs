//! Target configuration
//!
//! Settings are loaded from a JSON file (or inline JSON), optionally
//! overridden by `TARGET_GCS_*` environment variables, and validated once
//! before any sink is created.

use crate::error::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "TARGET_GCS_";

/// Default date format used for the `{date}` placeholder
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default key naming convention
pub const DEFAULT_KEY_NAMING_CONVENTION: &str = "{stream}_{timestamp}.jsonl";

// ============================================================================
// Target Config
// ============================================================================

/// Complete target configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Destination bucket name
    #[serde(default)]
    pub bucket_name: String,

    /// Path to a service-account JSON key file
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,

    /// Prefix prepended to every object key
    #[serde(default)]
    pub key_prefix: String,

    /// Object key template. Supports `{stream}`, `{date}` and `{timestamp}`
    #[serde(default)]
    pub key_naming_convention: Option<String>,

    /// strftime-style format for the `{date}` placeholder
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Add a `transformation_timestamp` field to every record
    #[serde(default)]
    pub transformation_timestamp: bool,
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            bucket_name: String::new(),
            credentials_file: None,
            key_prefix: String::new(),
            key_naming_convention: None,
            date_format: default_date_format(),
            transformation_timestamp: false,
        }
    }
}

impl TargetConfig {
    /// Create a config for the given bucket with default settings
    pub fn new(bucket_name: impl Into<String>) -> Self {
        Self {
            bucket_name: bucket_name.into(),
            ..Default::default()
        }
    }

    /// Set the service-account credentials file
    #[must_use]
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = Some(path.into());
        self
    }

    /// Set the key prefix
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the key naming convention
    #[must_use]
    pub fn with_key_naming_convention(mut self, template: impl Into<String>) -> Self {
        self.key_naming_convention = Some(template.into());
        self
    }

    /// Set the date format
    #[must_use]
    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Enable or disable the `transformation_timestamp` field
    #[must_use]
    pub fn with_transformation_timestamp(mut self, enabled: bool) -> Self {
        self.transformation_timestamp = enabled;
        self
    }

    /// Parse config from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load config from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Apply `TARGET_GCS_<SETTING>` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_overrides(std::env::vars())
    }

    /// Apply overrides from an iterator of `(name, value)` pairs
    ///
    /// Only names starting with [`ENV_PREFIX`] are considered. Unknown
    /// settings are ignored.
    pub fn apply_env_overrides<I, K, V>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in vars {
            let Some(setting) = name.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let value = value.into();
            match setting.to_ascii_lowercase().as_str() {
                "bucket_name" => self.bucket_name = value,
                "credentials_file" => self.credentials_file = Some(PathBuf::from(value)),
                "key_prefix" => self.key_prefix = value,
                "key_naming_convention" => self.key_naming_convention = Some(value),
                "date_format" => self.date_format = value,
                "transformation_timestamp" => {
                    self.transformation_timestamp = parse_bool("transformation_timestamp", &value)?;
                }
                other => tracing::debug!("Ignoring unknown setting from environment: {}", other),
            }
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.bucket_name.trim().is_empty() {
            return Err(Error::missing_field("bucket_name"));
        }

        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(Error::invalid_value(
                "date_format",
                format!("'{}' is not a valid strftime format", self.date_format),
            ));
        }

        if let Some(path) = &self.credentials_file {
            if !path.exists() {
                return Err(Error::invalid_value(
                    "credentials_file",
                    format!("{} does not exist", path.display()),
                ));
            }
        }

        Ok(())
    }

    /// Key naming convention, falling back to the default
    pub fn key_naming_convention(&self) -> &str {
        self.key_naming_convention
            .as_deref()
            .unwrap_or(DEFAULT_KEY_NAMING_CONVENTION)
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(Error::invalid_value(
            field,
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// JSON description of the supported settings
pub fn settings_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "bucket_name": {
                "type": "string",
                "description": "The name of the destination bucket"
            },
            "credentials_file": {
                "type": "string",
                "description": "Path to a service-account JSON key file"
            },
            "key_prefix": {
                "type": "string",
                "default": "",
                "description": "Prefix prepended to every object key"
            },
            "key_naming_convention": {
                "type": "string",
                "default": DEFAULT_KEY_NAMING_CONVENTION,
                "description": "Object key template. Supports {stream}, {date} and {timestamp}"
            },
            "date_format": {
                "type": "string",
                "default": DEFAULT_DATE_FORMAT,
                "description": "strftime-style format for the {date} placeholder"
            },
            "transformation_timestamp": {
                "type": "boolean",
                "default": false,
                "description": "Add a transformation_timestamp field to every record"
            }
        },
        "required": ["bucket_name"]
    })
}
