//! Execution results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Terminal status of one task execution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    /// Every step produced a validated value
    Success,
    /// At least one step succeeded before the chain stopped
    Partial,
    /// No validated value was produced, or the task definition is broken
    Failed,
}

/// Category of an error or warning recorded during execution.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IssueKind {
    /// Input did not match its declared shape
    ShapeMismatch,
    /// Chain failed integrity verification
    Integrity,
    /// Prompt execution failed
    Collaborator,
    /// Step output did not match its schema
    Schema,
    /// Input path could not be resolved
    Resolution,
    /// Execution was cancelled between steps
    Cancelled,
    /// Non-fatal anomaly in an accepted output
    Anomaly,
}

/// One error or warning, optionally tied to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskIssue {
    /// Category of the issue
    pub kind: IssueKind,
    /// Identifier of the step the issue arose on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_id: Option<String>,
    /// Human-readable description
    pub message: String,
}

impl TaskIssue {
    /// Create an issue that is not tied to a step.
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            step_id: None,
            message: message.into(),
        }
    }

    /// Create an issue raised while executing a step.
    pub fn for_step(kind: IssueKind, step_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            step_id: Some(step_id.into()),
            message: message.into(),
        }
    }
}

/// What a worker returns for one task execution.
///
/// `variables` holds every validated step output keyed by its
/// `output_variable`; it never contains the `input` pseudo-entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Terminal status
    pub status: TaskStatus,
    /// Validated outputs by variable name
    pub variables: BTreeMap<String, serde_json::Value>,
    /// Errors recorded during this execution
    pub errors: Vec<TaskIssue>,
    /// Warnings recorded during this execution
    pub warnings: Vec<TaskIssue>,
}

impl TaskResult {
    /// A failed result carrying a single error and no variables.
    pub fn failed(error: TaskIssue) -> Self {
        Self {
            status: TaskStatus::Failed,
            variables: BTreeMap::new(),
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    /// Whether every step succeeded.
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}
