//! Prompt template materialization.
//!
//! Placeholders are `{{path}}`. A path rooted at [`VALUE_ROOT`] addresses the
//! step's resolved input; any other root is looked up in the variable store.
//! Strings are inserted verbatim and every other JSON value compactly encoded.

use crate::{InputPath, VALUE_ROOT, VariableStore};
use regex::Regex;
use serde_json::Value as JsonValue;
use taglink_error::{ResolutionError, ResolutionErrorKind};

const PLACEHOLDER: &str = r"\{\{([^{}]*)\}\}";

fn placeholder_regex() -> Result<Regex, ResolutionError> {
    Regex::new(PLACEHOLDER).map_err(|e| {
        ResolutionError::new(ResolutionErrorKind::Render {
            path: PLACEHOLDER.to_string(),
            message: format!("Invalid template regex: {}", e),
        })
    })
}

/// Raw placeholder paths in a template, in order of appearance.
///
/// # Examples
///
/// ```
/// use taglink_chain::placeholders;
///
/// let found = placeholders("Summary: {{ summary.text }}\n{{value}}").unwrap();
/// assert_eq!(found, vec!["summary.text", "value"]);
/// ```
pub fn placeholders(template: &str) -> Result<Vec<String>, ResolutionError> {
    let re = placeholder_regex()?;
    Ok(re
        .captures_iter(template)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str().trim().to_string()))
        .collect())
}

/// Substitute every placeholder in `template`.
///
/// # Errors
///
/// Returns an error if a placeholder is malformed or cannot be resolved.
#[tracing::instrument(skip_all, fields(template_len = template.len()))]
pub fn render(
    template: &str,
    value: &JsonValue,
    store: &VariableStore,
) -> Result<String, ResolutionError> {
    let re = placeholder_regex()?;
    let mut rendered = String::with_capacity(template.len());
    let mut last = 0;

    for cap in re.captures_iter(template) {
        let (Some(whole), Some(inner)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let path: InputPath = inner.as_str().parse()?;
        let resolved = if path.root() == VALUE_ROOT {
            path.walk(value)?
        } else {
            store.resolve(&path)?
        };

        rendered.push_str(&template[last..whole.start()]);
        rendered.push_str(&to_prompt_text(&path, resolved)?);
        last = whole.end();
    }
    rendered.push_str(&template[last..]);

    Ok(rendered)
}

fn to_prompt_text(path: &InputPath, value: &JsonValue) -> Result<String, ResolutionError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other).map_err(|e| {
            ResolutionError::new(ResolutionErrorKind::Render {
                path: path.to_string(),
                message: e.to_string(),
            })
        }),
    }
}
