//! Types exchanged with collaborators.

use serde::{Deserialize, Serialize};

/// Raw output of a prompt execution, before schema validation.
///
/// Usually a JSON object; a JSON string holds free model text that may embed
/// the structured output.
pub type RawOutput = serde_json::Value;

/// Raw source material as supplied by a source-content collaborator.
///
/// `lines` are `(speaker_index, text)` for conversations and
/// `(block_index, markdown)` for webpages. `participants` is ignored for
/// webpages.
///
/// # Examples
///
/// ```
/// use taglink_interface::RawSource;
///
/// let raw: RawSource = serde_json::from_str(r#"{
///     "guid": "c-1",
///     "participants": ["alice", "bob"],
///     "lines": [[0, "hi"], [1, "hello"]]
/// }"#).unwrap();
/// assert_eq!(raw.total, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawSource {
    /// Source document identifier
    pub guid: String,
    /// Speaker names
    #[serde(default)]
    pub participants: Vec<String>,
    /// Ordered `(index, text)` lines
    #[serde(default)]
    pub lines: Vec<(usize, String)>,
    /// Line count declared by the source, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}
