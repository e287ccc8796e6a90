//! Output schema error types.

/// Ways a step's raw output can fail its declared schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum SchemaErrorKind {
    /// No validator is registered under this output type
    #[display("Unknown output type '{}'", _0)]
    UnknownOutputType(String),
    /// Raw output is not a JSON object
    #[display("Expected a JSON object, found {}", _0)]
    NotAnObject(String),
    /// Required field is absent
    #[display("Missing required field '{}'", _0)]
    MissingField(String),
    /// Field is present with the wrong JSON type
    #[display("Field '{}' must be {}, found {}", field, expected, found)]
    WrongFieldType {
        /// Field name (with element index when inside an array)
        field: String,
        /// Expected JSON type
        expected: String,
        /// JSON type actually present
        found: String,
    },
    /// Fixed type tag does not match the output type
    #[display("Type tag must be '{}', found '{}'", expected, found)]
    TypeTagMismatch {
        /// Tag the schema requires
        expected: String,
        /// Tag actually present
        found: String,
    },
    /// Field not part of the schema
    #[display("Unexpected field '{}'", _0)]
    UnexpectedField(String),
    /// Text response contains no extractable JSON
    #[display("No JSON found in text response: {}", _0)]
    Unparseable(String),
}

/// Error raised when a step output does not conform to its schema.
///
/// # Examples
///
/// ```
/// use taglink_error::{SchemaError, SchemaErrorKind};
///
/// let err = SchemaError::new(SchemaErrorKind::MissingField("tags".to_string()));
/// assert!(format!("{}", err).contains("'tags'"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Schema Error: {} at line {} in {}", kind, line, file)]
pub struct SchemaError {
    /// The specific error condition
    pub kind: SchemaErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl SchemaError {
    /// Create a new SchemaError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: SchemaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
