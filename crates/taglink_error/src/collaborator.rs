//! Prompt-execution collaborator error types.

/// Failure modes of the prompt-execution collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CollaboratorErrorKind {
    /// Call did not finish within the step timeout
    #[display("Prompt execution timed out after {}ms", _0)]
    Timeout(u64),
    /// Model refused to answer
    #[display("Model refused: {}", _0)]
    Refusal(String),
    /// Response arrived but could not be interpreted
    #[display("Malformed response: {}", _0)]
    MalformedResponse(String),
    /// Backend could not be reached or returned an error
    #[display("Backend unavailable: {}", _0)]
    Unavailable(String),
}

/// Error returned by a prompt-execution collaborator.
///
/// # Examples
///
/// ```
/// use taglink_error::{CollaboratorError, CollaboratorErrorKind};
///
/// let err = CollaboratorError::new(CollaboratorErrorKind::Timeout(30_000));
/// assert!(err.is_timeout());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Collaborator Error: {} at line {} in {}", kind, line, file)]
pub struct CollaboratorError {
    /// The specific error condition
    pub kind: CollaboratorErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl CollaboratorError {
    /// Create a new CollaboratorError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CollaboratorErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the call was cut off by a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self.kind, CollaboratorErrorKind::Timeout(_))
    }
}
