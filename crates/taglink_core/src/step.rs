//! Prompt chain steps.

use serde::{Deserialize, Serialize};

/// Execution kind of a step that calls the language model.
pub const LLM_CALL: &str = "llm_call";

/// Execution kinds a worker knows how to run.
pub const SUPPORTED_STEP_TYPES: &[&str] = &[LLM_CALL];

/// One stage of a prompt chain.
///
/// Steps are immutable once a task is issued. `crc` is computed by the
/// coordinator over the step's normative fields and lets a worker detect any
/// later mutation; `title`, `name` and `description` are prose and do not
/// contribute to it.
///
/// # Examples
///
/// ```
/// use taglink_core::PromptChainStep;
///
/// let step = PromptChainStep::builder()
///     .step(1u32)
///     .id("tag-convo")
///     .input_path("input.transcript")
///     .prompt_template("Tag this conversation:\n{{value}}")
///     .output_variable("tags")
///     .output_type("List[str]")
///     .build()
///     .unwrap();
///
/// assert_eq!(step.kind(), "llm_call");
/// assert_eq!(*step.crc(), 0);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct PromptChainStep {
    /// 1-based ordinal within the chain
    step: u32,
    /// Stable identifier shared by coordinator and worker copies
    id: String,
    /// Checksum of the step's canonical content
    #[builder(default)]
    crc: u32,
    /// Human-facing title
    #[builder(default)]
    title: String,
    /// Human-facing name
    #[builder(default)]
    name: String,
    /// Human-facing description
    #[builder(default)]
    description: String,
    /// Execution kind, e.g. `llm_call`
    #[serde(rename = "type")]
    #[builder(default = "LLM_CALL.to_string()")]
    kind: String,
    /// Dotted reference to `input` or an earlier step's output variable
    input_path: String,
    /// Prompt text with `{{path}}` placeholders
    prompt_template: String,
    /// Variable name this step's validated output is stored under
    output_variable: String,
    /// Schema Registry key of the expected output shape
    output_type: String,
}

impl PromptChainStep {
    /// Creates a new step builder.
    pub fn builder() -> PromptChainStepBuilder {
        PromptChainStepBuilder::default()
    }

    /// Returns a copy of this step carrying the given checksum.
    pub fn with_crc(self, crc: u32) -> Self {
        Self { crc, ..self }
    }
}
