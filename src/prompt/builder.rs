//! Layered prompt builder.
//!
//! Prompts are assembled from a stack of plain-text fragments. Each layer is
//! appended in order; blank fragments are skipped so layers can be optional.
//!
//! Variable substitution uses `{{key}}` syntax and is applied once at
//! [`build()`](PromptBuilder::build) time, after all layers are joined.
//! Substitution is a single left-to-right pass: inserted values are never
//! re-scanned, so user text containing `{{…}}` is emitted literally.

use std::collections::HashMap;

const SEPARATOR: &str = "\n\n";

/// Fluent builder that assembles a layered prompt.
///
/// ```rust
/// use wcc_bot::prompt::PromptBuilder;
///
/// let prompt = PromptBuilder::new()
///     .append("You are {{name}}.")
///     .append("Member: {{query}}")
///     .var("name", "WCC Alexa")
///     .var("query", "What is WCC?")
///     .build();
/// assert_eq!(prompt, "You are WCC Alexa.\n\nMember: What is WCC?");
/// ```
#[derive(Debug, Default, Clone)]
pub struct PromptBuilder {
    parts: Vec<String>,
    vars: HashMap<String, String>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text fragment. Leading/trailing whitespace is trimmed.
    pub fn append(mut self, text: impl Into<String>) -> Self {
        let s = text.into();
        let trimmed = s.trim();
        if !trimmed.is_empty() {
            self.parts.push(trimmed.to_string());
        }
        self
    }

    /// Register `{{key}}` → `value` substitution pairs applied at build time.
    pub fn with_vars<'a, I>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in vars {
            self.vars.insert(k.to_string(), v.to_string());
        }
        self
    }

    /// Register a single variable. Convenience wrapper around [`with_vars`](Self::with_vars).
    pub fn var(mut self, key: &str, value: impl Into<String>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    /// Assemble all layers, join with blank lines, and apply variable substitution.
    pub fn build(self) -> String {
        substitute(&self.parts.join(SEPARATOR), &self.vars)
    }
}

/// Replace every `{{key}}` in `template` whose key is in `vars`.
///
/// Unknown placeholders are left untouched. Output is independent of map
/// iteration order.
pub fn substitute(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let key = &after_open[..end];
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
