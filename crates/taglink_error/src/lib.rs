//! Error types for taglink.
//!
//! This crate provides the error types shared by every taglink crate.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! The five execution error domains map one-to-one onto the failure classes a
//! task can end with: [`ShapeError`] (input normalization), [`IntegrityError`]
//! (chain definition), [`CollaboratorError`] (prompt execution),
//! [`SchemaError`] (step output shape) and [`ResolutionError`] (input paths).
//!
//! # Examples
//!
//! ```
//! use taglink_error::{ConfigError, TaglinkResult};
//!
//! fn load() -> TaglinkResult<String> {
//!     Err(ConfigError::new("missing [engine] section"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborator;
mod config;
mod error;
mod integrity;
mod json;
mod resolution;
mod schema;
mod shape;

pub use collaborator::{CollaboratorError, CollaboratorErrorKind};
pub use config::ConfigError;
pub use error::{TaglinkError, TaglinkErrorKind, TaglinkResult};
pub use integrity::{IntegrityError, IntegrityErrorKind};
pub use json::JsonError;
pub use resolution::{ResolutionError, ResolutionErrorKind};
pub use schema::{SchemaError, SchemaErrorKind};
pub use shape::{ShapeError, ShapeErrorKind};
