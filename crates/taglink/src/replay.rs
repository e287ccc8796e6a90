//! Offline prompt executor that replays recorded model outputs.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use taglink_error::{CollaboratorError, CollaboratorErrorKind, JsonError, TaglinkResult};
use taglink_interface::{PromptExecutor, RawOutput};

/// Returns recorded outputs in call order, one per step.
///
/// Useful for re-running a task offline against a known set of model
/// responses while debugging a prompt chain.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use taglink::{PromptExecutor, ReplayExecutor};
///
/// let replay = ReplayExecutor::new(vec![json!({"tags": ["a"], "type": "List[str]"})]);
/// assert_eq!(replay.remaining(), 1);
/// assert_eq!(replay.name(), "replay");
/// ```
#[derive(Debug, Default)]
pub struct ReplayExecutor {
    responses: Mutex<VecDeque<RawOutput>>,
}

impl ReplayExecutor {
    /// Replay `responses` in order.
    pub fn new(responses: Vec<RawOutput>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    /// Load responses from a JSON file holding an array of raw outputs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a JSON array.
    pub fn from_file(path: impl AsRef<Path>) -> TaglinkResult<Self> {
        let value: JsonValue = crate::read_json(path)?;
        match value {
            JsonValue::Array(responses) => {
                tracing::debug!(responses = responses.len(), "Loaded recorded responses");
                Ok(Self::new(responses))
            }
            other => Err(JsonError::new(format!(
                "Recorded responses must be a JSON array, found {}",
                other
            ))
            .into()),
        }
    }

    /// Responses not yet replayed.
    pub fn remaining(&self) -> usize {
        self.queue().len()
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<RawOutput>> {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PromptExecutor for ReplayExecutor {
    async fn invoke(
        &self,
        prompt: &str,
        output_type: &str,
    ) -> Result<RawOutput, CollaboratorError> {
        tracing::debug!(prompt_len = prompt.len(), output_type, "Replaying recorded response");
        let next = self.queue().pop_front();
        next.ok_or_else(|| {
            CollaboratorError::new(CollaboratorErrorKind::Unavailable(
                "no recorded response left".to_string(),
            ))
        })
    }

    fn name(&self) -> &str {
        "replay"
    }
}
