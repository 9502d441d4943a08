//! Placeholder interpolation for object key templates
//!
//! Handles `{variable}` placeholders in key naming conventions, e.g.
//! `"{stream}/{date}/{stream}_{timestamp}.jsonl"`. Undefined variables render
//! as an empty string. `{{` and `}}` render as literal braces.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Regex for matching escaped braces or a `{name}` / `{name:spec}` placeholder
static TEMPLATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}").unwrap());

/// Variables available to a template
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable
    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.vars.insert(name.into(), value.to_string());
        self
    }

    /// Get a variable by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }
}

/// Placeholder name without any trailing `:format` spec
fn placeholder_name(inner: &str) -> &str {
    inner.split(':').next().unwrap_or_default().trim()
}

/// Render a template string with the given context
///
/// Unknown placeholders resolve to an empty string rather than failing.
pub fn render(template: &str, ctx: &TemplateContext) -> String {
    TEMPLATE_REGEX
        .replace_all(template, |cap: &Captures<'_>| match &cap[0] {
            "{{" => "{".to_string(),
            "}}" => "}".to_string(),
            _ => {
                let name = cap.get(1).map_or("", |m| placeholder_name(m.as_str()));
                ctx.get(name).unwrap_or_default().to_string()
            }
        })
        .into_owned()
}
