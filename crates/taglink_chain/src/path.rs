//! Dotted paths into the variable store.
//!
//! A path is `root(.segment)*`. The root names either the task input
//! ([`INPUT_ROOT`]), the current step's resolved input inside a template
//! ([`VALUE_ROOT`]), or an output variable. Segments walk JSON objects by key
//! and arrays by index, so `input.lines.0` is the first line of the input.

use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use taglink_error::{ResolutionError, ResolutionErrorKind};

/// Root naming the task's input pseudo-entry.
pub const INPUT_ROOT: &str = "input";

/// Root naming the current step's resolved input inside a prompt template.
pub const VALUE_ROOT: &str = "value";

/// A parsed `root.segment.segment` path.
///
/// # Examples
///
/// ```
/// use taglink_chain::InputPath;
///
/// let path: InputPath = "input.lines.0".parse().unwrap();
/// assert_eq!(path.root(), "input");
/// assert_eq!(path.segments(), ["lines", "0"]);
/// assert!("summary..text".parse::<InputPath>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InputPath {
    raw: String,
    root: String,
    segments: Vec<String>,
}

impl InputPath {
    /// The first segment.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Segments after the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The path as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Follow the segments starting from `value`, the value of the root.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first segment that does not exist.
    pub fn walk<'a>(&self, value: &'a JsonValue) -> Result<&'a JsonValue, ResolutionError> {
        let mut current = value;
        for segment in &self.segments {
            let next = match current {
                JsonValue::Object(map) => map.get(segment),
                JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| {
                ResolutionError::new(ResolutionErrorKind::MissingSegment {
                    path: self.raw.clone(),
                    segment: segment.clone(),
                })
            })?;
        }
        Ok(current)
    }
}

impl FromStr for InputPath {
    type Err = ResolutionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let parts: Vec<&str> = raw.split('.').collect();
        if raw.is_empty() || parts.iter().any(|part| part.trim().is_empty()) {
            return Err(ResolutionError::new(ResolutionErrorKind::MalformedPath(
                s.to_string(),
            )));
        }

        Ok(Self {
            raw: raw.to_string(),
            root: parts[0].trim().to_string(),
            segments: parts[1..].iter().map(|p| p.trim().to_string()).collect(),
        })
    }
}

impl fmt::Display for InputPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn walks_objects_and_arrays() {
        let value = json!({"lines": [[0, "hi"], [1, "bye"]]});
        let path: InputPath = "input.lines.1.1".parse().unwrap();
        assert_eq!(path.walk(&value).unwrap(), &json!("bye"));
    }

    #[test]
    fn reports_missing_segment() {
        let value = json!({"lines": []});
        let path: InputPath = "input.lines.3".parse().unwrap();
        let err = path.walk(&value).unwrap_err();
        assert_eq!(
            err.kind,
            ResolutionErrorKind::MissingSegment {
                path: "input.lines.3".to_string(),
                segment: "3".to_string(),
            }
        );
    }

    #[test]
    fn rejects_empty_segments() {
        assert!("".parse::<InputPath>().is_err());
        assert!(".tags".parse::<InputPath>().is_err());
        assert!("tags.".parse::<InputPath>().is_err());
    }
}
