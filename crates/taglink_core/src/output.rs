//! Output Union: schema templates for structured step outputs.

use serde::{Deserialize, Serialize};

/// Output type key of a tag list.
pub const TAG_LIST_OUTPUT_TYPE: &str = "List[str]";

/// Output type key of a free-text value.
pub const TEXT_OUTPUT_TYPE: &str = "str";

/// Example of the structured output a chain produces.
///
/// The `type` field is the discriminator and doubles as the Schema Registry
/// key for the shape.
///
/// # Examples
///
/// ```
/// use taglink_core::{ExampleOutput, TaggingExampleOutput};
///
/// let example: ExampleOutput = serde_json::from_str(
///     r#"{"type": "List[str]", "tags": ["greeting"]}"#,
/// ).unwrap();
/// assert_eq!(example.output_type(), "List[str]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "type")]
pub enum ExampleOutput {
    /// List of string tags
    #[serde(rename = "List[str]")]
    Tagging(TaggingExampleOutput),
    /// Single text value
    #[serde(rename = "str")]
    Text(TextExampleOutput),
}

impl ExampleOutput {
    /// The Schema Registry key for this variant.
    pub fn output_type(&self) -> &'static str {
        match self {
            ExampleOutput::Tagging(_) => TAG_LIST_OUTPUT_TYPE,
            ExampleOutput::Text(_) => TEXT_OUTPUT_TYPE,
        }
    }
}

/// Tag list output, `{"tags": [...], "type": "List[str]"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaggingExampleOutput {
    /// Tags, in the order the model produced them
    pub tags: Vec<String>,
}

/// Text output, `{"text": "...", "type": "str"}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextExampleOutput {
    /// The text value
    pub text: String,
}
