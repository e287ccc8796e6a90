//! Schema Registry: validators for structured step outputs.
//!
//! The registry maps an `output_type` key to an [`OutputSchema`]. It is
//! assembled once at startup from an explicit table and then shared
//! read-only, so adding an output type never touches the executor.

use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use taglink_core::{TAG_LIST_OUTPUT_TYPE, TEXT_OUTPUT_TYPE};
use taglink_error::{SchemaError, SchemaErrorKind};

/// A step output that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOutput {
    /// Typed value stored in the variable store
    pub value: JsonValue,
    /// Non-fatal anomalies found while validating
    pub warnings: Vec<String>,
}

/// Validator for one output type.
///
/// Implementations must be pure: the same raw value always yields the same
/// result.
pub trait OutputSchema: Send + Sync {
    /// Registry key, e.g. `List[str]`.
    fn output_type(&self) -> &str;

    /// Accept exactly the documented shape and reject everything else.
    fn validate(&self, raw: &JsonValue) -> Result<ValidatedOutput, SchemaError>;
}

/// `{"tags": [string...], "type": "List[str]"}`, validated to the tag list.
///
/// Blank and repeated tags are dropped with a warning; the first occurrence
/// of a repeated tag keeps its position.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagListSchema;

impl OutputSchema for TagListSchema {
    fn output_type(&self) -> &str {
        TAG_LIST_OUTPUT_TYPE
    }

    fn validate(&self, raw: &JsonValue) -> Result<ValidatedOutput, SchemaError> {
        let object = tagged_object(raw, TAG_LIST_OUTPUT_TYPE, &["tags", "type"])?;
        let tags = required(object, "tags")?;
        let items = tags.as_array().ok_or_else(|| {
            wrong_type("tags".to_string(), "an array of strings", tags)
        })?;

        let mut accepted: Vec<String> = Vec::with_capacity(items.len());
        let mut warnings = Vec::new();
        for (i, item) in items.iter().enumerate() {
            let tag = item
                .as_str()
                .ok_or_else(|| wrong_type(format!("tags[{}]", i), "a string", item))?;
            if tag.trim().is_empty() {
                warnings.push(format!("dropped blank tag at position {}", i));
            } else if accepted.iter().any(|seen| seen == tag) {
                warnings.push(format!("dropped duplicate tag '{}'", tag));
            } else {
                accepted.push(tag.to_string());
            }
        }

        Ok(ValidatedOutput {
            value: JsonValue::from(accepted),
            warnings,
        })
    }
}

/// `{"text": string, "type": "str"}`, validated to the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSchema;

impl OutputSchema for TextSchema {
    fn output_type(&self) -> &str {
        TEXT_OUTPUT_TYPE
    }

    fn validate(&self, raw: &JsonValue) -> Result<ValidatedOutput, SchemaError> {
        let object = tagged_object(raw, TEXT_OUTPUT_TYPE, &["text", "type"])?;
        let text = required(object, "text")?;
        let text = text
            .as_str()
            .ok_or_else(|| wrong_type("text".to_string(), "a string", text))?;

        let mut warnings = Vec::new();
        if text.trim().is_empty() {
            warnings.push("text output is blank".to_string());
        }

        Ok(ValidatedOutput {
            value: JsonValue::from(text),
            warnings,
        })
    }
}

/// Runtime mapping from output type key to validator.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use taglink_chain::SchemaRegistry;
///
/// let registry = SchemaRegistry::with_defaults();
/// let out = registry
///     .validate("List[str]", &json!({"tags": ["greeting"], "type": "List[str]"}))
///     .unwrap();
/// assert_eq!(out.value, json!(["greeting"]));
/// assert!(registry.validate("Dict[str,int]", &json!({})).is_err());
/// ```
#[derive(Clone, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<dyn OutputSchema>>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in output type.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TagListSchema);
        registry.register(TextSchema);
        registry
    }

    /// Register a validator under its own output type, replacing any
    /// previous validator for that key.
    pub fn register<S: OutputSchema + 'static>(&mut self, schema: S) -> &mut Self {
        self.schemas
            .insert(schema.output_type().to_string(), Arc::new(schema));
        self
    }

    /// Whether `output_type` has a validator.
    pub fn contains(&self, output_type: &str) -> bool {
        self.schemas.contains_key(output_type)
    }

    /// Registered output type keys, sorted.
    pub fn output_types(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Validate `raw` against the validator registered for `output_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if `output_type` is unknown or `raw` does not
    /// conform.
    pub fn validate(
        &self,
        output_type: &str,
        raw: &JsonValue,
    ) -> Result<ValidatedOutput, SchemaError> {
        let schema = self.schemas.get(output_type).ok_or_else(|| {
            SchemaError::new(SchemaErrorKind::UnknownOutputType(output_type.to_string()))
        })?;
        schema.validate(raw)
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("output_types", &self.output_types())
            .finish()
    }
}

/// Name of a JSON value's type for error messages.
fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[track_caller]
fn wrong_type(field: String, expected: &str, found: &JsonValue) -> SchemaError {
    SchemaError::new(SchemaErrorKind::WrongFieldType {
        field,
        expected: expected.to_string(),
        found: json_type(found).to_string(),
    })
}

fn required<'a>(object: &'a Map<String, JsonValue>, field: &str) -> Result<&'a JsonValue, SchemaError> {
    object
        .get(field)
        .ok_or_else(|| SchemaError::new(SchemaErrorKind::MissingField(field.to_string())))
}

/// Check that `raw` is an object with only `allowed` fields and the exact
/// `type` tag.
fn tagged_object<'a>(
    raw: &'a JsonValue,
    tag: &str,
    allowed: &[&str],
) -> Result<&'a Map<String, JsonValue>, SchemaError> {
    let object = raw.as_object().ok_or_else(|| {
        SchemaError::new(SchemaErrorKind::NotAnObject(json_type(raw).to_string()))
    })?;

    if let Some(extra) = object.keys().find(|key| !allowed.contains(&key.as_str())) {
        return Err(SchemaError::new(SchemaErrorKind::UnexpectedField(
            extra.clone(),
        )));
    }

    let found = required(object, "type")?;
    let found = found
        .as_str()
        .ok_or_else(|| wrong_type("type".to_string(), "a string", found))?;
    if found != tag {
        return Err(SchemaError::new(SchemaErrorKind::TypeTagMismatch {
            expected: tag.to_string(),
            found: found.to_string(),
        }));
    }

    Ok(object)
}
