//! Collaborator trait definitions for taglink.
//!
//! The execution engine only talks to the outside world through these traits:
//! a [`PromptExecutor`] runs materialized prompts against a language model, a
//! [`SourceProvider`] supplies raw source content, and a [`ResultSink`]
//! receives finished results.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;
mod types;

pub use traits::{PromptExecutor, ResultSink, SourceProvider};
pub use types::{RawOutput, RawSource};
