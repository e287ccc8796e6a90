//! Trait definitions for the engine's external collaborators.

use crate::{RawOutput, RawSource};
use async_trait::async_trait;
use taglink_core::{Task, TaskResult};
use taglink_error::{CollaboratorError, TaglinkResult};

/// Runs one materialized prompt against a language model.
///
/// Implementations own model selection, retries and cost accounting. The
/// engine treats a call as a single fallible operation and bounds it with its
/// own timeout.
#[async_trait]
pub trait PromptExecutor: Send + Sync {
    /// Execute `prompt` and return the model's raw structured output.
    ///
    /// `output_type` is the Schema Registry key the engine will validate the
    /// output against, so implementations can request a matching format.
    async fn invoke(&self, prompt: &str, output_type: &str)
    -> Result<RawOutput, CollaboratorError>;

    /// Name of the backend (e.g., "openai", "replay").
    fn name(&self) -> &str;
}

/// Supplies raw conversation or document content by guid.
///
/// Only the input normalizer calls this.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    /// Fetch the raw content of the document identified by `guid`.
    async fn fetch(&self, guid: &str) -> TaglinkResult<RawSource>;
}

/// Receives finished task results for persistence or scoring.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Accept the result of executing `task`.
    async fn accept(&self, task: &Task, result: &TaskResult) -> TaglinkResult<()>;
}
