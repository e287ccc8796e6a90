//! Execution engine: runs a task's prompt chain to a [`TaskResult`].

use crate::{
    EngineConfig, InputPath, SchemaRegistry, VariableStore, check_input, parse_raw_output, render,
    verify,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::Duration;
use taglink_core::{
    IssueKind, LLM_CALL, PromptChainStep, SUPPORTED_STEP_TYPES, Task, TaskIssue, TaskResult,
    TaskStatus,
};
use taglink_error::{
    CollaboratorError, CollaboratorErrorKind, IntegrityErrorKind, SchemaErrorKind,
};
use taglink_interface::PromptExecutor;
use tokio_util::sync::CancellationToken;

/// Lifecycle of one task execution.
///
/// `Pending -> IntegrityChecked -> Running(i) -> Running(i+1) | Aborted | Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExecutionState {
    /// Nothing checked yet
    Pending,
    /// Pre-flight and chain verification passed
    IntegrityChecked,
    /// Executing the step with this ordinal
    Running(u32),
    /// Terminal: every step ran, or some did before a step failure
    Completed(TaskStatus),
    /// Terminal: nothing usable was produced
    Aborted,
}

impl ExecutionState {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Completed(_) | Self::Aborted)
    }

    /// Whether `next` may follow this state.
    fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Self::Aborted) => true,
            (Self::Pending, Self::IntegrityChecked) => true,
            (Self::IntegrityChecked, Self::Running(_)) => true,
            (Self::Running(current), Self::Running(following)) => following > current,
            (Self::Running(_), Self::Completed(status)) => status != TaskStatus::Failed,
            _ => false,
        }
    }
}

/// Executes prompt chains against a prompt-execution collaborator.
///
/// The registry and configuration are read-only; every call to
/// [`execute`](Self::execute) gets a fresh variable store, so one executor
/// can serve many tasks concurrently.
#[derive(Debug)]
pub struct ChainExecutor<E: PromptExecutor> {
    executor: E,
    registry: Arc<SchemaRegistry>,
    step_timeout: Duration,
    supported_api_versions: Vec<f64>,
}

impl<E: PromptExecutor> ChainExecutor<E> {
    /// Create an executor with the built-in output types and default engine
    /// settings.
    pub fn new(executor: E) -> Self {
        Self::with_registry(executor, Arc::new(SchemaRegistry::with_defaults()))
    }

    /// Create an executor that validates outputs against `registry`.
    pub fn with_registry(executor: E, registry: Arc<SchemaRegistry>) -> Self {
        let defaults = EngineConfig::default();
        Self {
            executor,
            registry,
            step_timeout: defaults.step_timeout(),
            supported_api_versions: defaults.supported_api_versions().clone(),
        }
    }

    /// Apply engine settings.
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.step_timeout = config.step_timeout();
        self.supported_api_versions = config.supported_api_versions().clone();
        self
    }

    /// Bound every collaborator call by `timeout`.
    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    /// The prompt-execution collaborator.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The schema registry.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Execute a task's prompt chain.
    ///
    /// Every issue in the returned result is also appended to
    /// `task.errors` / `task.warnings`.
    pub async fn execute(&self, task: &mut Task) -> TaskResult {
        self.execute_with_cancel(task, &CancellationToken::new())
            .await
    }

    /// Execute a task's prompt chain, stopping before the next step once
    /// `cancel` fires.
    #[tracing::instrument(
        skip(self, task, cancel),
        fields(
            guid = %task.guid(),
            steps = task.prompt_chain.len(),
            executor = self.executor.name(),
            status
        )
    )]
    pub async fn execute_with_cancel(
        &self,
        task: &mut Task,
        cancel: &CancellationToken,
    ) -> TaskResult {
        let result = self.run(task, cancel).await;

        task.errors.extend(result.errors.iter().cloned());
        task.warnings.extend(result.warnings.iter().cloned());

        tracing::Span::current().record("status", tracing::field::display(result.status));
        tracing::info!(
            status = %result.status,
            variables = result.variables.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Task execution finished"
        );
        result
    }

    async fn run(&self, task: &Task, cancel: &CancellationToken) -> TaskResult {
        let mut state = ExecutionState::Pending;

        if let Err(issue) = self.preflight(task) {
            transition(&mut state, ExecutionState::Aborted);
            tracing::error!(kind = %issue.kind, message = %issue.message, "Task rejected before execution");
            return TaskResult::failed(issue);
        }
        transition(&mut state, ExecutionState::IntegrityChecked);

        let mut steps: Vec<&PromptChainStep> = task.prompt_chain.iter().collect();
        steps.sort_by_key(|step| *step.step());

        let mut store = VariableStore::new(&task.input);
        let mut warnings = Vec::new();
        let mut failure: Option<TaskIssue> = None;
        let mut completed = 0usize;

        for step in steps {
            if cancel.is_cancelled() {
                tracing::warn!(step_id = %step.id(), "Execution cancelled");
                failure = Some(TaskIssue::for_step(
                    IssueKind::Cancelled,
                    step.id().clone(),
                    format!("Cancelled before step {}", step.step()),
                ));
                break;
            }

            transition(&mut state, ExecutionState::Running(*step.step()));
            match self.run_step(step, &mut store).await {
                Ok(anomalies) => {
                    completed += 1;
                    warnings.extend(anomalies);
                }
                Err(issue) => {
                    failure = Some(issue);
                    break;
                }
            }
        }

        let status = match &failure {
            None => TaskStatus::Success,
            Some(issue) if issue.kind == IssueKind::Resolution => TaskStatus::Failed,
            Some(_) if completed > 0 => TaskStatus::Partial,
            Some(_) => TaskStatus::Failed,
        };
        transition(
            &mut state,
            match status {
                TaskStatus::Failed => ExecutionState::Aborted,
                done => ExecutionState::Completed(done),
            },
        );

        TaskResult {
            status,
            variables: store.into_variables(),
            errors: failure.into_iter().collect(),
            warnings,
        }
    }

    /// Reject a task before any step runs.
    fn preflight(&self, task: &Task) -> Result<(), TaskIssue> {
        check_input(&task.input)
            .map_err(|e| TaskIssue::new(IssueKind::ShapeMismatch, e.kind.to_string()))?;

        let supported = self
            .supported_api_versions
            .iter()
            .any(|v| (v - task.api_version).abs() < f64::EPSILON);
        if !supported {
            let reason = IntegrityErrorKind::UnsupportedApiVersion(task.api_version.to_string());
            return Err(TaskIssue::new(IssueKind::Integrity, reason.to_string()));
        }

        if let Some(step) = task
            .prompt_chain
            .iter()
            .find(|step| !SUPPORTED_STEP_TYPES.contains(&step.kind().as_str()))
        {
            let reason = IntegrityErrorKind::UnsupportedStepType {
                step_id: step.id().clone(),
                kind: step.kind().clone(),
            };
            return Err(TaskIssue::for_step(
                IssueKind::Integrity,
                step.id().clone(),
                reason.to_string(),
            ));
        }

        if let Some(step) = task
            .prompt_chain
            .iter()
            .find(|step| !self.registry.contains(step.output_type()))
        {
            let reason = SchemaErrorKind::UnknownOutputType(step.output_type().clone());
            return Err(TaskIssue::for_step(
                IssueKind::Schema,
                step.id().clone(),
                reason.to_string(),
            ));
        }

        verify(&task.prompt_chain).map_err(|e| TaskIssue {
            kind: IssueKind::Integrity,
            step_id: e.step_id().map(str::to_string),
            message: e.kind.to_string(),
        })
    }

    /// Run one step, storing its validated output. Returns the step's
    /// anomaly warnings.
    #[tracing::instrument(
        skip(self, step, store),
        fields(step = step.step(), step_id = %step.id(), output_type = %step.output_type())
    )]
    async fn run_step(
        &self,
        step: &PromptChainStep,
        store: &mut VariableStore,
    ) -> Result<Vec<TaskIssue>, TaskIssue> {
        let step_id = step.id().clone();
        let issue =
            |kind: IssueKind, message: String| TaskIssue::for_step(kind, step_id.clone(), message);

        match step.kind().as_str() {
            LLM_CALL => {}
            other => {
                let reason = IntegrityErrorKind::UnsupportedStepType {
                    step_id: step_id.clone(),
                    kind: other.to_string(),
                };
                return Err(issue(IssueKind::Integrity, reason.to_string()));
            }
        }

        let path = step
            .input_path()
            .parse::<InputPath>()
            .map_err(|e| issue(IssueKind::Resolution, e.kind.to_string()))?;
        let value: JsonValue = store
            .resolve(&path)
            .map_err(|e| issue(IssueKind::Resolution, e.kind.to_string()))?
            .clone();
        let prompt = render(step.prompt_template(), &value, store)
            .map_err(|e| issue(IssueKind::Resolution, e.kind.to_string()))?;
        tracing::debug!(prompt_len = prompt.len(), "Prompt materialized");

        let raw = self
            .invoke(&prompt, step.output_type())
            .await
            .map_err(|e| {
                tracing::error!(error = %e.kind, "Prompt execution failed");
                issue(IssueKind::Collaborator, e.kind.to_string())
            })?;

        let validated = parse_raw_output(raw)
            .and_then(|parsed| self.registry.validate(step.output_type(), &parsed))
            .map_err(|e| {
                tracing::error!(error = %e.kind, "Step output rejected");
                issue(IssueKind::Schema, e.kind.to_string())
            })?;

        let anomalies: Vec<TaskIssue> = validated
            .warnings
            .into_iter()
            .map(|warning| {
                tracing::warn!(warning = %warning, "Output anomaly");
                issue(IssueKind::Anomaly, warning)
            })
            .collect();

        store
            .insert(*step.step(), step.output_variable(), validated.value)
            .map_err(|e| issue(IssueKind::Resolution, e.kind.to_string()))?;
        tracing::info!(output_variable = %step.output_variable(), "Step completed");

        Ok(anomalies)
    }

    /// Invoke the collaborator under the step timeout.
    async fn invoke(&self, prompt: &str, output_type: &str) -> Result<JsonValue, CollaboratorError> {
        match tokio::time::timeout(self.step_timeout, self.executor.invoke(prompt, output_type)).await
        {
            Ok(result) => result,
            Err(_) => {
                let millis = u64::try_from(self.step_timeout.as_millis()).unwrap_or(u64::MAX);
                Err(CollaboratorError::new(CollaboratorErrorKind::Timeout(millis)))
            }
        }
    }
}

/// Advance `state`, refusing moves the lifecycle does not allow.
fn transition(state: &mut ExecutionState, next: ExecutionState) {
    let legal = state.can_advance_to(next);
    debug_assert!(legal, "illegal execution state change {:?} -> {:?}", state, next);
    if !legal {
        tracing::error!(from = ?*state, to = ?next, "Illegal execution state change");
        return;
    }
    tracing::debug!(from = ?*state, to = ?next, "Execution state change");
    *state = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_moves_forward_only() {
        use ExecutionState::*;

        assert!(Pending.can_advance_to(IntegrityChecked));
        assert!(Pending.can_advance_to(Aborted));
        assert!(IntegrityChecked.can_advance_to(Running(1)));
        assert!(Running(1).can_advance_to(Running(2)));
        assert!(Running(2).can_advance_to(Completed(TaskStatus::Partial)));
        assert!(Running(2).can_advance_to(Aborted));

        assert!(!Pending.can_advance_to(Running(1)));
        assert!(!Running(2).can_advance_to(Running(1)));
        assert!(!Running(1).can_advance_to(Completed(TaskStatus::Failed)));
        assert!(!IntegrityChecked.can_advance_to(Completed(TaskStatus::Success)));
        assert!(!Aborted.can_advance_to(Pending));
        assert!(!Completed(TaskStatus::Success).can_advance_to(Running(3)));
    }
}
