//! Top-level error wrapper types.

use crate::{
    CollaboratorError, ConfigError, IntegrityError, JsonError, ResolutionError, SchemaError,
    ShapeError,
};

/// Every error condition a taglink crate can report.
///
/// # Examples
///
/// ```
/// use taglink_error::{TaglinkError, JsonError};
///
/// let err: TaglinkError = JsonError::new("unexpected end of input").into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TaglinkErrorKind {
    /// Raw source material did not fit the requested input shape
    #[from(ShapeError)]
    Shape(ShapeError),
    /// Prompt chain failed integrity verification
    #[from(IntegrityError)]
    Integrity(IntegrityError),
    /// Prompt-execution collaborator failed
    #[from(CollaboratorError)]
    Collaborator(CollaboratorError),
    /// Step output did not match its declared schema
    #[from(SchemaError)]
    Schema(SchemaError),
    /// Input path or template placeholder could not be resolved
    #[from(ResolutionError)]
    Resolution(ResolutionError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
}

/// Taglink error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Taglink Error: {}", _0)]
pub struct TaglinkError(Box<TaglinkErrorKind>);

impl TaglinkError {
    /// Create a new error from a kind.
    pub fn new(kind: TaglinkErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TaglinkErrorKind {
        &self.0
    }
}

impl<T> From<T> for TaglinkError
where
    T: Into<TaglinkErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for taglink operations.
pub type TaglinkResult<T> = std::result::Result<T, TaglinkError>;
