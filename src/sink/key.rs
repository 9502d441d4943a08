//! Destination object key derivation

use crate::config::TargetConfig;
use crate::error::{Error, Result};
use crate::template::{self, TemplateContext};
use crate::types::OutputFormat;
use chrono::{DateTime, TimeZone};
use std::fmt::Write as _;

/// Extraction timestamp in seconds since epoch, rounded to the nearest second
pub fn extraction_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    now.timestamp() + i64::from(now.timestamp_subsec_millis() >= 500)
}

/// ISO-8601 timestamp without offset, at microsecond precision
///
/// The fractional part is omitted when it is zero.
pub fn transformation_timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let format = if now.timestamp_subsec_micros() == 0 {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6f"
    };
    now.format(format).to_string()
}

/// Format a date with a user-supplied strftime pattern
///
/// Returns an error instead of panicking on invalid patterns.
pub fn format_date<Tz: TimeZone>(now: &DateTime<Tz>, format: &str) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    write!(out, "{}", now.format(format)).map_err(|_| {
        Error::invalid_value(
            "date_format",
            format!("'{format}' is not a valid strftime format"),
        )
    })?;
    Ok(out)
}

/// Join prefix and base name into a key path
///
/// A doubled slash is collapsed (one non-overlapping pass) and leading
/// slashes are stripped.
pub fn prefixed_key(prefix: &str, base_name: &str) -> String {
    format!("{prefix}/{base_name}")
        .replace("//", "/")
        .trim_start_matches('/')
        .to_string()
}

/// Render the object key for `stream` at time `now`
///
/// The `{stream}`, `{date}` and `{timestamp}` placeholders may appear in
/// either the prefix or the naming convention.
pub fn render_key_name<Tz: TimeZone>(
    config: &TargetConfig,
    stream_name: &str,
    format: OutputFormat,
    now: &DateTime<Tz>,
) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let timestamp = extraction_timestamp(now);

    let base_name = match &config.key_naming_convention {
        Some(convention) => convention.clone(),
        None => format!("{{stream}}_{{timestamp}}.{}", format.extension()),
    };
    let path = prefixed_key(&config.key_prefix, &base_name);
    let date = format_date(now, &config.date_format)?;

    let mut ctx = TemplateContext::new();
    ctx.set("stream", stream_name)
        .set("date", date)
        .set("timestamp", timestamp);

    Ok(template::render(&path, &ctx))
}
