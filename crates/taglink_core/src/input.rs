//! Input Union: the canonical shapes of source material a task can carry.

use serde::{Deserialize, Serialize};

/// Discriminator for the Input Union.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InputKind {
    /// Dialogue between participants
    Conversation,
    /// Markdown blocks of a scraped webpage
    WebpageMarkdown,
}

/// A dialogue transcript.
///
/// `lines` holds `(speaker_index, text)` tuples where `speaker_index` points
/// into `participants`.
///
/// # Examples
///
/// ```
/// use taglink_core::ConversationInput;
///
/// let convo = ConversationInput::new(
///     "c-1",
///     vec!["alice".to_string(), "bob".to_string()],
///     vec![(0, "hi".to_string()), (1, "bye".to_string())],
/// );
/// assert_eq!(*convo.total(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct ConversationInput {
    /// Source document identifier
    guid: String,
    /// Speaker names, indexed by `speaker_index`
    participants: Vec<String>,
    /// Ordered `(speaker_index, text)` lines
    lines: Vec<(usize, String)>,
    /// Number of lines
    total: usize,
}

impl ConversationInput {
    /// Create a conversation input; `total` is derived from `lines`.
    pub fn new(
        guid: impl Into<String>,
        participants: Vec<String>,
        lines: Vec<(usize, String)>,
    ) -> Self {
        let total = lines.len();
        Self {
            guid: guid.into(),
            participants,
            lines,
            total,
        }
    }

    /// Render the dialogue as `speaker: text` lines.
    ///
    /// Lines whose speaker index has no participant fall back to `speaker_N`.
    pub fn transcript(&self) -> String {
        self.lines
            .iter()
            .map(|(speaker, text)| match self.participants.get(*speaker) {
                Some(name) => format!("{}: {}", name, text),
                None => format!("speaker_{}: {}", speaker, text),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A webpage converted to markdown blocks.
///
/// `lines` holds `(block_index, markdown_text)` tuples.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct WebpageMarkdownInput {
    /// Source document identifier
    guid: String,
    /// Ordered `(block_index, markdown_text)` blocks
    lines: Vec<(usize, String)>,
}

impl WebpageMarkdownInput {
    /// Create a webpage input.
    pub fn new(guid: impl Into<String>, lines: Vec<(usize, String)>) -> Self {
        Self {
            guid: guid.into(),
            lines,
        }
    }

    /// Join the blocks into one markdown document.
    pub fn markdown(&self) -> String {
        self.lines
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// The source material of a task. Exactly one variant is active.
///
/// On the wire this is `{ "input_type": ..., "guid": ..., "data": {...} }`;
/// the `input_type` discriminator selects how `data` is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_more::From)]
#[serde(try_from = "TaskInputWire", into = "TaskInputWire")]
pub enum TaskInput {
    /// Dialogue transcript
    Conversation(ConversationInput),
    /// Markdown webpage
    WebpageMarkdown(WebpageMarkdownInput),
}

impl TaskInput {
    /// The discriminator of the active variant.
    pub fn kind(&self) -> InputKind {
        match self {
            TaskInput::Conversation(_) => InputKind::Conversation,
            TaskInput::WebpageMarkdown(_) => InputKind::WebpageMarkdown,
        }
    }

    /// Identifier of the source document.
    pub fn guid(&self) -> &str {
        match self {
            TaskInput::Conversation(c) => &c.guid,
            TaskInput::WebpageMarkdown(w) => &w.guid,
        }
    }

    /// Ordered `(index, text)` lines of either variant.
    pub fn lines(&self) -> &[(usize, String)] {
        match self {
            TaskInput::Conversation(c) => &c.lines,
            TaskInput::WebpageMarkdown(w) => &w.lines,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TaskInputWire {
    input_type: InputKind,
    guid: String,
    data: serde_json::Value,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConversationData {
    participants: Vec<String>,
    lines: Vec<(usize, String)>,
    total: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WebpageMarkdownData {
    lines: Vec<(usize, String)>,
}

impl TryFrom<TaskInputWire> for TaskInput {
    type Error = String;

    fn try_from(wire: TaskInputWire) -> Result<Self, Self::Error> {
        match wire.input_type {
            InputKind::Conversation => {
                let data: ConversationData = serde_json::from_value(wire.data)
                    .map_err(|e| format!("invalid conversation data: {}", e))?;
                Ok(TaskInput::Conversation(ConversationInput {
                    guid: wire.guid,
                    participants: data.participants,
                    lines: data.lines,
                    total: data.total,
                }))
            }
            InputKind::WebpageMarkdown => {
                let data: WebpageMarkdownData = serde_json::from_value(wire.data)
                    .map_err(|e| format!("invalid webpage_markdown data: {}", e))?;
                Ok(TaskInput::WebpageMarkdown(WebpageMarkdownInput {
                    guid: wire.guid,
                    lines: data.lines,
                }))
            }
        }
    }
}

impl From<TaskInput> for TaskInputWire {
    fn from(input: TaskInput) -> Self {
        let input_type = input.kind();
        let (guid, data) = match input {
            TaskInput::Conversation(c) => (
                c.guid,
                serde_json::json!({
                    "participants": c.participants,
                    "lines": c.lines,
                    "total": c.total,
                }),
            ),
            TaskInput::WebpageMarkdown(w) => (w.guid, serde_json::json!({ "lines": w.lines })),
        };
        Self {
            input_type,
            guid,
            data,
        }
    }
}
