//! Taglink: task contracts and prompt-chain execution for LLM tagging workers.
//!
//! A coordinator issues a [`Task`] holding one normalized input and an
//! ordered, checksummed prompt chain. A worker verifies the chain, runs it
//! step by step through a [`PromptExecutor`], validates every output against
//! the [`SchemaRegistry`] and returns a [`TaskResult`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use taglink::{ChainExecutor, ReplayExecutor, TaglinkConfig, read_json};
//!
//! # async fn example() -> taglink::TaglinkResult<()> {
//! let mut task: taglink::Task = read_json("task.json")?;
//! let model = ReplayExecutor::from_file("responses.json")?;
//!
//! let config = TaglinkConfig::load()?;
//! let executor = ChainExecutor::new(model).with_config(config.engine());
//! let result = executor.execute(&mut task).await;
//! println!("{}", result.status);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `taglink_error` - Error types
//! - `taglink_core` - Task, input, output and result contracts
//! - `taglink_interface` - Collaborator traits
//! - `taglink_chain` - Normalizer, integrity checker, schema registry, executor, worker pool
//!
//! This crate (`taglink`) re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod io;
mod replay;
pub mod telemetry;

pub use io::{read_json, to_pretty_json, write_json};
pub use replay::ReplayExecutor;

pub use taglink_chain::*;
pub use taglink_core::*;
pub use taglink_error::*;
pub use taglink_interface::*;
