//! JSON file helpers shared by the CLI and tests.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use taglink_error::{JsonError, TaglinkResult};

/// Read and deserialize a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not match `T`.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> TaglinkResult<T> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        JsonError::new(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let value = serde_json::from_str(&contents).map_err(|e| {
        JsonError::new(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    tracing::debug!(bytes = contents.len(), "Loaded JSON file");
    Ok(value)
}

/// Serialize a value as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the value cannot be represented as JSON.
pub fn to_pretty_json<T: Serialize>(value: &T) -> TaglinkResult<String> {
    Ok(serde_json::to_string_pretty(value)
        .map_err(|e| JsonError::new(format!("Failed to serialize: {}", e)))?)
}

/// Write a value to `path` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> TaglinkResult<()> {
    let path = path.as_ref();
    let json = to_pretty_json(value)?;
    std::fs::write(path, json + "\n").map_err(|e| {
        JsonError::new(format!("Failed to write {}: {}", path.display(), e))
    })?;
    Ok(())
}
