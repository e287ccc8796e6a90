//! Per-execution store of step outputs.

use crate::{INPUT_ROOT, InputPath};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeMap;
use taglink_core::TaskInput;
use taglink_error::{ResolutionError, ResolutionErrorKind};

/// Append-only, write-once mapping from output variable to validated value.
///
/// The store is created fresh for every execution and owned by it. The task
/// input is always addressable under [`INPUT_ROOT`]; every other entry records
/// the ordinal of the step that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableStore {
    input: JsonValue,
    entries: BTreeMap<String, (u32, JsonValue)>,
}

impl VariableStore {
    /// Create a store holding only the input pseudo-entry.
    pub fn new(input: &TaskInput) -> Self {
        Self {
            input: input_view(input),
            entries: BTreeMap::new(),
        }
    }

    /// Record the output of step `step` under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` was already written or names the input.
    pub fn insert(
        &mut self,
        step: u32,
        name: &str,
        value: JsonValue,
    ) -> Result<(), ResolutionError> {
        if name == INPUT_ROOT || self.entries.contains_key(name) {
            return Err(ResolutionError::new(ResolutionErrorKind::AlreadyWritten(
                name.to_string(),
            )));
        }
        self.entries.insert(name.to_string(), (step, value));
        Ok(())
    }

    /// Value stored under a root name, including the input pseudo-entry.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        if name == INPUT_ROOT {
            return Some(&self.input);
        }
        self.entries.get(name).map(|(_, value)| value)
    }

    /// Ordinal of the step that produced `name`.
    pub fn produced_by(&self, name: &str) -> Option<u32> {
        self.entries.get(name).map(|(step, _)| *step)
    }

    /// Resolve a path against the stored values.
    ///
    /// # Errors
    ///
    /// Returns an error if the root has not been produced or a segment is
    /// missing.
    pub fn resolve(&self, path: &InputPath) -> Result<&JsonValue, ResolutionError> {
        let root = self.get(path.root()).ok_or_else(|| {
            ResolutionError::new(ResolutionErrorKind::MissingVariable(
                path.root().to_string(),
            ))
        })?;
        path.walk(root)
    }

    /// Number of produced variables, not counting the input.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no step has produced a variable yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the store, returning produced variables without the input.
    pub fn into_variables(self) -> BTreeMap<String, JsonValue> {
        self.entries
            .into_iter()
            .map(|(name, (_, value))| (name, value))
            .collect()
    }
}

/// JSON view of a task input as seen by input paths and templates.
///
/// Conversations expose `participants`, `lines`, `total` and a rendered
/// `transcript`; webpages expose `lines` and the joined `markdown`.
pub fn input_view(input: &TaskInput) -> JsonValue {
    match input {
        TaskInput::Conversation(convo) => json!({
            "input_type": input.kind().to_string(),
            "guid": convo.guid(),
            "participants": convo.participants(),
            "lines": convo.lines(),
            "total": convo.total(),
            "transcript": convo.transcript(),
        }),
        TaskInput::WebpageMarkdown(page) => json!({
            "input_type": input.kind().to_string(),
            "guid": page.guid(),
            "lines": page.lines(),
            "markdown": page.markdown(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taglink_core::ConversationInput;

    fn store() -> VariableStore {
        VariableStore::new(
            &ConversationInput::new(
                "c-1",
                vec!["ann".to_string()],
                vec![(0, "hello".to_string())],
            )
            .into(),
        )
    }

    #[test]
    fn input_is_addressable() {
        let store = store();
        let path: InputPath = "input.transcript".parse().unwrap();
        assert_eq!(store.resolve(&path).unwrap(), &json!("ann: hello"));
        assert!(store.is_empty());
    }

    #[test]
    fn variables_are_write_once() {
        let mut store = store();
        store.insert(1, "tags", json!(["a"])).unwrap();
        assert!(store.insert(2, "tags", json!(["b"])).is_err());
        assert!(store.insert(2, "input", json!(null)).is_err());
        assert_eq!(store.produced_by("tags"), Some(1));
        assert_eq!(store.into_variables().get("tags"), Some(&json!(["a"])));
    }

    #[test]
    fn missing_root_is_reported() {
        let store = store();
        let path: InputPath = "summary.text".parse().unwrap();
        let err = store.resolve(&path).unwrap_err();
        assert_eq!(
            err.kind,
            ResolutionErrorKind::MissingVariable("summary".to_string())
        );
    }
}
