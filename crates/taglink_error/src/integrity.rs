//! Prompt chain integrity error types.

/// Specific reasons a prompt chain fails integrity verification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum IntegrityErrorKind {
    /// Chain has no steps
    #[display("Prompt chain is empty")]
    EmptyChain,
    /// Task declares a contract version this worker does not speak
    #[display("Unsupported api_version {}", _0)]
    UnsupportedApiVersion(String),
    /// Stored checksum does not match the recomputed one
    #[display("Step '{}' checksum mismatch: stored {}, computed {}", step_id, stored, computed)]
    ChecksumMismatch {
        /// Step identifier
        step_id: String,
        /// Checksum carried by the step
        stored: u32,
        /// Checksum recomputed from the step's canonical fields
        computed: u32,
    },
    /// Same ordinal appears on more than one step
    #[display("Duplicate step ordinal {}", _0)]
    DuplicateOrdinal(u32),
    /// Ordinals do not form the sequence 1..N
    #[display("Step ordinals are not contiguous: expected {}, found {}", expected, found)]
    NonContiguousOrdinals {
        /// Ordinal that should appear at this position
        expected: u32,
        /// Ordinal actually present
        found: u32,
    },
    /// Same step id appears on more than one step
    #[display("Duplicate step id '{}'", _0)]
    DuplicateStepId(String),
    /// Output variable produced by more than one step
    #[display("Output variable '{}' is produced by more than one step", _0)]
    DuplicateOutputVariable(String),
    /// Output variable name is reserved or not an identifier
    #[display("Step '{}' has invalid output variable name '{}'", step_id, name)]
    InvalidOutputVariable {
        /// Step identifier
        step_id: String,
        /// Offending variable name
        name: String,
    },
    /// Path is empty or has an empty segment
    #[display("Step '{}' has malformed path '{}'", step_id, path)]
    MalformedPath {
        /// Step identifier
        step_id: String,
        /// Offending path
        path: String,
    },
    /// Path refers to the step's own output
    #[display("Step '{}' references its own output through '{}'", step_id, path)]
    SelfReference {
        /// Step identifier
        step_id: String,
        /// Offending path
        path: String,
    },
    /// Path refers to the output of a later step
    #[display("Step '{}' references later output through '{}'", step_id, path)]
    ForwardReference {
        /// Step identifier
        step_id: String,
        /// Offending path
        path: String,
    },
    /// Path refers to a variable no step produces
    #[display("Step '{}' references unknown variable through '{}'", step_id, path)]
    UnknownReference {
        /// Step identifier
        step_id: String,
        /// Offending path
        path: String,
    },
    /// Step declares an execution kind this worker cannot run
    #[display("Step '{}' has unsupported type '{}'", step_id, kind)]
    UnsupportedStepType {
        /// Step identifier
        step_id: String,
        /// Declared execution kind
        kind: String,
    },
}

/// Error raised when a prompt chain cannot be trusted.
///
/// # Examples
///
/// ```
/// use taglink_error::{IntegrityError, IntegrityErrorKind};
///
/// let err = IntegrityError::new(IntegrityErrorKind::DuplicateOrdinal(2));
/// assert!(format!("{}", err).contains("Duplicate step ordinal 2"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Integrity Error: {} at line {} in {}", kind, line, file)]
pub struct IntegrityError {
    /// The specific error condition
    pub kind: IntegrityErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl IntegrityError {
    /// Create a new IntegrityError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: IntegrityErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Identifier of the step the violation was found on, if any.
    pub fn step_id(&self) -> Option<&str> {
        match &self.kind {
            IntegrityErrorKind::ChecksumMismatch { step_id, .. }
            | IntegrityErrorKind::InvalidOutputVariable { step_id, .. }
            | IntegrityErrorKind::MalformedPath { step_id, .. }
            | IntegrityErrorKind::SelfReference { step_id, .. }
            | IntegrityErrorKind::ForwardReference { step_id, .. }
            | IntegrityErrorKind::UnknownReference { step_id, .. }
            | IntegrityErrorKind::UnsupportedStepType { step_id, .. } => Some(step_id),
            IntegrityErrorKind::DuplicateStepId(step_id) => Some(step_id),
            _ => None,
        }
    }
}
