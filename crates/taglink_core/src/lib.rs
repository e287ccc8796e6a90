//! Core data contracts for taglink.
//!
//! This crate provides the wire-level types a coordinator sends to a worker
//! ([`Task`], [`TaskInput`], [`PromptChainStep`], [`ExampleOutput`]) and the
//! [`TaskResult`] a worker hands back.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod input;
mod output;
mod result;
mod step;
mod task;

pub use input::{ConversationInput, InputKind, TaskInput, WebpageMarkdownInput};
pub use output::{
    ExampleOutput, TEXT_OUTPUT_TYPE, TAG_LIST_OUTPUT_TYPE, TaggingExampleOutput,
    TextExampleOutput,
};
pub use result::{IssueKind, TaskIssue, TaskResult, TaskStatus};
pub use step::{
    LLM_CALL, PromptChainStep, PromptChainStepBuilder, PromptChainStepBuilderError,
    SUPPORTED_STEP_TYPES,
};
pub use task::Task;
