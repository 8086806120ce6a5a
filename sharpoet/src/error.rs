use miette::Diagnostic;
use thiserror::Error;

/// Result type for sharpoet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or emitting declarations.
///
/// Ambiguous simple names are not errors: the writer falls back to fully
/// qualified names and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Error {
    #[error("{context}: {message}")]
    #[diagnostic(
        code(sharpoet::construction),
        help("builders validate on attach; fix the declaration named in the message")
    )]
    Construction { context: String, message: String },

    #[error("malformed code block: {message}")]
    #[diagnostic(
        code(sharpoet::structural),
        help("placeholders are $L, $S, $T, $N, $W, $Z, $>, $<, $[, $] and $$")
    )]
    Structural { message: String },

    #[error("invalid type reference '{name}': {reason}")]
    #[diagnostic(code(sharpoet::invalid_reference))]
    InvalidReference { name: String, reason: String },

    #[error("failed to write rendered source")]
    #[diagnostic(code(sharpoet::write))]
    Write(#[from] std::fmt::Error),
}

impl Error {
    /// Create a construction error for the declaration described by `context`.
    pub fn construction(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a structural error.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
        }
    }

    /// Create an invalid reference error.
    pub fn invalid_reference(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
