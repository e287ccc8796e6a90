//! Prompt-chain engine for taglink.
//!
//! A worker receives a [`Task`](taglink_core::Task), checks that its prompt
//! chain was not altered after it was issued, then runs each step in order:
//! resolve the step's input, materialize its prompt, call the model through a
//! [`PromptExecutor`](taglink_interface::PromptExecutor), validate the output
//! against the Schema Registry and store it for later steps.
//!
//! # Example
//!
//! ```rust,ignore
//! use taglink_chain::{ChainExecutor, TaglinkConfig};
//!
//! # async fn example(task: &mut taglink_core::Task, model: impl taglink_interface::PromptExecutor) -> taglink_error::TaglinkResult<()> {
//! let config = TaglinkConfig::load()?;
//! let executor = ChainExecutor::new(model).with_config(config.engine());
//!
//! let result = executor.execute(task).await;
//! println!("{}: {} variables", result.status, result.variables.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod executor;
mod extraction;
mod integrity;
mod normalizer;
mod path;
mod pool;
mod schema;
mod store;
mod template;

pub use config::{EngineConfig, PoolConfig, TaglinkConfig};
pub use executor::ChainExecutor;
pub use extraction::{extract_json, parse_raw_output};
pub use integrity::{RESERVED_VARIABLES, canonical_bytes, compute_crc, seal, verify};
pub use normalizer::{check_input, load, normalize, parse_input_kind};
pub use path::{INPUT_ROOT, InputPath, VALUE_ROOT};
pub use pool::WorkerPool;
pub use schema::{OutputSchema, SchemaRegistry, TagListSchema, TextSchema, ValidatedOutput};
pub use store::{VariableStore, input_view};
pub use template::{placeholders, render};
