//! `{{variable}}` template rendering for campaign copy.

use std::collections::HashMap;

use tracing::warn;

/// Named values available to a single render.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    vars: HashMap<&'static str, String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.vars.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TemplateEngine;

impl TemplateEngine {
    pub fn new() -> Self {
        Self
    }

    /// Substitutes every `{{key}}` found in `context`. Unknown placeholders
    /// are left in place.
    pub fn render(&self, template: &str, context: &TemplateContext) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            let Some(len) = rest[start + 2..].find("}}") else {
                break;
            };
            let key = rest[start + 2..start + 2 + len].trim();
            result.push_str(&rest[..start]);
            match context.get(key) {
                Some(value) => result.push_str(value),
                None => {
                    warn!(placeholder = key, "Unresolved template placeholder");
                    result.push_str(&rest[start..start + len + 4]);
                }
            }
            rest = &rest[start + len + 4..];
        }

        result.push_str(rest);
        result
    }
}
