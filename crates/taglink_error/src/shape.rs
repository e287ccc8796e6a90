//! Input normalization error types.

/// Ways raw source material can fail to fit an input shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ShapeErrorKind {
    /// Input type discriminator is not one of the known variants
    #[display("Unknown input type: {}", _0)]
    UnknownInputType(String),
    /// Source document has no guid
    #[display("Source guid is empty")]
    EmptyGuid,
    /// A line references a speaker that is not in the participant list
    #[display("Line {} references speaker {} but only {} participants exist", line, speaker, participants)]
    UnknownSpeaker {
        /// Zero-based position of the offending line
        line: usize,
        /// Speaker index referenced by the line
        speaker: usize,
        /// Number of participants available
        participants: usize,
    },
    /// Declared line count disagrees with the lines present
    #[display("Declared total {} does not match {} lines", declared, actual)]
    TotalMismatch {
        /// Total declared by the source
        declared: usize,
        /// Number of lines actually present
        actual: usize,
    },
    /// Document block indices went backwards
    #[display("Block index {} at position {} follows block index {}", index, position, previous)]
    NonMonotonicBlocks {
        /// Zero-based position of the offending block
        position: usize,
        /// Block index found at that position
        index: usize,
        /// Block index of the preceding block
        previous: usize,
    },
    /// Source-content collaborator could not supply the document
    #[display("Source unavailable for '{}': {}", guid, message)]
    SourceUnavailable {
        /// Requested document guid
        guid: String,
        /// Collaborator's failure message
        message: String,
    },
}

/// Shape mismatch raised by the input normalizer.
///
/// # Examples
///
/// ```
/// use taglink_error::{ShapeError, ShapeErrorKind};
///
/// let err = ShapeError::new(ShapeErrorKind::TotalMismatch { declared: 3, actual: 2 });
/// assert!(format!("{}", err).contains("Shape mismatch"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Shape mismatch: {} at line {} in {}", kind, line, file)]
pub struct ShapeError {
    /// The specific error condition
    pub kind: ShapeErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl ShapeError {
    /// Create a new ShapeError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ShapeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
