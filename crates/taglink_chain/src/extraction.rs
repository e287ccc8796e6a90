//! Extracting structured output from free model text.
//!
//! Collaborators that return plain text instead of a JSON object often wrap
//! the object in a markdown fence or surround it with commentary.

use serde_json::Value as JsonValue;
use taglink_error::{SchemaError, SchemaErrorKind};

/// Find the first well-formed JSON object or array embedded in `response`.
///
/// Fenced markdown blocks are tried first. Otherwise every `{` or `[` is a
/// candidate start; the balanced span opening there is kept only if it
/// parses, so bracketed prose such as `[Note]` ahead of the real document is
/// skipped.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use taglink_chain::extract_json;
///
/// let response = "[Note] tags follow:\n{\"tags\": [\"a\"], \"type\": \"List[str]\"}";
/// assert_eq!(
///     extract_json(response),
///     Some(json!({"tags": ["a"], "type": "List[str]"}))
/// );
/// ```
pub fn extract_json(response: &str) -> Option<JsonValue> {
    fenced_blocks(response)
        .filter_map(|block| serde_json::from_str::<JsonValue>(block).ok())
        .find(|value| value.is_object() || value.is_array())
        .or_else(|| {
            response
                .char_indices()
                .filter(|(_, ch)| matches!(ch, '{' | '['))
                .find_map(|(start, _)| {
                    let span = &response[start..];
                    let end = balanced_len(span)?;
                    serde_json::from_str::<JsonValue>(&span[..end]).ok()
                })
        })
}

/// Turn a raw collaborator output into a JSON value ready for validation.
///
/// Objects and arrays pass through unchanged; strings are searched for an
/// embedded JSON document.
///
/// # Errors
///
/// Returns an error if a string holds no parseable JSON.
pub fn parse_raw_output(raw: JsonValue) -> Result<JsonValue, SchemaError> {
    let JsonValue::String(text) = raw else {
        return Ok(raw);
    };

    extract_json(&text).ok_or_else(|| {
        tracing::warn!(response_length = text.len(), "No JSON found in model text");
        SchemaError::new(SchemaErrorKind::Unparseable(text.chars().take(100).collect()))
    })
}

/// Bodies of markdown fences, with any language tag line removed. An
/// unterminated final fence still yields its body.
fn fenced_blocks(response: &str) -> impl Iterator<Item = &str> {
    response
        .split("```")
        .skip(1)
        .step_by(2)
        .map(|block| match block.split_once('\n') {
            Some((tag, body)) if !opens_document(tag) => body.trim(),
            _ => block.trim(),
        })
}

fn opens_document(line: &str) -> bool {
    line.trim_start().starts_with(|c: char| c == '{' || c == '[')
}

/// Byte length of the bracketed span at the start of `text`, if it closes
/// with matching brackets outside string literals.
fn balanced_len(text: &str) -> Option<usize> {
    let mut closers = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                if closers.pop() != Some(ch) {
                    return None;
                }
                if closers.is_empty() {
                    return Some(i + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
