//! Path and placeholder resolution error types.

/// Reasons a path could not be resolved against the variable store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ResolutionErrorKind {
    /// Root variable has not been produced
    #[display("Variable '{}' is not available", _0)]
    MissingVariable(String),
    /// A segment does not exist below the root
    #[display("Path '{}' has no segment '{}'", path, segment)]
    MissingSegment {
        /// Full path being resolved
        path: String,
        /// First segment that could not be followed
        segment: String,
    },
    /// Path is empty or has an empty segment
    #[display("Malformed path '{}'", _0)]
    MalformedPath(String),
    /// Value could not be rendered into a prompt
    #[display("Cannot render '{}': {}", path, message)]
    Render {
        /// Path of the value
        path: String,
        /// Render failure
        message: String,
    },
    /// Output variable has already been written
    #[display("Variable '{}' was already written", _0)]
    AlreadyWritten(String),
}

/// Error raised when an input path or placeholder cannot be resolved.
///
/// # Examples
///
/// ```
/// use taglink_error::{ResolutionError, ResolutionErrorKind};
///
/// let err = ResolutionError::new(ResolutionErrorKind::MissingVariable("summary".to_string()));
/// assert!(format!("{}", err).contains("summary"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Resolution Error: {} at line {} in {}", kind, line, file)]
pub struct ResolutionError {
    /// The specific error condition
    pub kind: ResolutionErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ResolutionError {
    /// Create a new ResolutionError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ResolutionErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
