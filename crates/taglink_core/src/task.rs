//! The task contract a coordinator issues to a worker.

use crate::{ExampleOutput, InputKind, PromptChainStep, TaskInput, TaskIssue};
use serde::{Deserialize, Serialize};

/// The unit of work.
///
/// The coordinator creates and serializes a task; a worker only consumes it
/// and appends to `errors` and `warnings` while executing it.
///
/// The convenience views [`total`](Task::total), [`guid`](Task::guid),
/// [`participants`](Task::participants), [`lines`](Task::lines),
/// [`prompts`](Task::prompts) and [`data_type`](Task::data_type) are computed
/// from `input` and `prompt_chain` on every call, so they cannot drift from
/// their source fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Execution mode tag
    pub mode: String,
    /// Contract version pinning the shape of every nested type
    pub api_version: f64,
    /// Kind of job, e.g. `conversation_tagging`
    pub job_type: String,
    /// Downstream scorer that consumes the result
    pub scoring_mechanism: String,
    /// Source material
    pub input: TaskInput,
    /// Ordered chain of prompt steps
    pub prompt_chain: Vec<PromptChainStep>,
    /// Schema template of the final output
    pub example_output: ExampleOutput,
    /// Errors accumulated during execution
    #[serde(default)]
    pub errors: Vec<TaskIssue>,
    /// Warnings accumulated during execution
    #[serde(default)]
    pub warnings: Vec<TaskIssue>,
}

impl Task {
    /// Number of lines in the input.
    pub fn total(&self) -> usize {
        self.input.lines().len()
    }

    /// Source document identifier.
    pub fn guid(&self) -> &str {
        self.input.guid()
    }

    /// Conversation participants; empty for non-conversation inputs.
    pub fn participants(&self) -> &[String] {
        match &self.input {
            TaskInput::Conversation(c) => c.participants(),
            TaskInput::WebpageMarkdown(_) => &[],
        }
    }

    /// Ordered `(index, text)` lines of the input.
    pub fn lines(&self) -> &[(usize, String)] {
        self.input.lines()
    }

    /// Prompt templates of the chain, in chain order.
    pub fn prompts(&self) -> Vec<&str> {
        self.prompt_chain
            .iter()
            .map(|step| step.prompt_template().as_str())
            .collect()
    }

    /// Discriminator of the input.
    pub fn data_type(&self) -> InputKind {
        self.input.kind()
    }
}
