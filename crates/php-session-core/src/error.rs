//! Error types for PHP session decoding.
//!
//! Every error aborts the whole decode. The document decoder attaches the
//! unconsumed remainder of the input before handing the error back, so the
//! caller can see where decoding stopped.

use std::fmt;
use thiserror::Error;

/// The main error type for PHP session decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct SessionDecodeError {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Character offset into the input when the error was raised.
    pub offset: usize,
    /// Optional context about what was being decoded.
    pub context: Option<String>,
    /// Input text left unconsumed when the error reached the document decoder.
    pub remaining: Option<String>,
}

impl fmt::Display for SessionDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)?;
        if let Some(ref ctx) = self.context {
            write!(f, " ({})", ctx)?;
        }
        if let Some(ref remaining) = self.remaining {
            write!(f, ", left text: \"{}\"", remaining)?;
        }
        Ok(())
    }
}

/// Specific kinds of decoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The text of an `i`, `d` or `r` value is not a number.
    #[error("\"{0}\" is not a number")]
    NotANumber(String),

    /// The text of a `b` value is not literally `0` or `1`.
    #[error("\"{0}\" is not a boolean number")]
    NotABoolean(String),

    /// The tag does not name any known value type.
    #[error("unknown type \"{0}\"")]
    UnknownType(String),

    /// A composite value was used as an array or object key.
    #[error("invalid key type: {0} cannot be used as a container key")]
    InvalidKey(&'static str),

    /// Nesting depth exceeded.
    #[error("maximum nesting depth ({0}) exceeded")]
    MaxDepthExceeded(usize),

    /// The decoded tree does not fit the requested typed shape.
    #[error("decoded data does not match the requested shape: {0}")]
    ShapeMismatch(String),
}

impl SessionDecodeError {
    /// Create a new error with the given kind and offset.
    #[inline]
    pub fn new(kind: ErrorKind, offset: usize) -> Self {
        Self {
            kind,
            offset,
            context: None,
            remaining: None,
        }
    }

    /// Add context to the error.
    #[inline]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Attach the unconsumed input left in the cursor.
    #[cold]
    pub fn with_remaining(mut self, remaining: impl Into<String>) -> Self {
        self.remaining = Some(remaining.into());
        self
    }
}

/// Result type alias for PHP session decoding.
pub type Result<T> = std::result::Result<T, SessionDecodeError>;
