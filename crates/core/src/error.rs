//! Error types for Mercury
//!
//! All failures surfaced by the codec, the sequencer, the stream transport and
//! the client are represented by the [`Error`] enum. Errors are:
//! - **Structured**: each variant carries typed fields instead of a bare message
//! - **Cloneable**: one terminal error is stored in a readiness gate and handed
//!   to every caller that was waiting on it
//! - **Serializable**: they can be logged or forwarded as JSON

use serde::{Deserialize, Serialize};

/// Result type alias for Mercury operations
pub type Result<T> = std::result::Result<T, Error>;

/// Mercury errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Lifecycle | `NotInitialized`, `AlreadyInitialized`, `AlreadyClosed` | Misuse of a stream or transport |
/// | Stream end | `Eof` | Benign "no further data"; not a failure |
/// | Wire | `Decode` | Malformed wire value |
/// | Transport | `Transport`, `Http` | Socket error, unclean close, HTTP failure |
/// | Sequencing | `Operation` | Failure scoped to one sequenced submission |
/// | Usage | `Unsupported`, `InvalidInput` | Rejected before any I/O |
///
/// # Example
///
/// ```ignore
/// loop {
///     match stream.recv().await {
///         Ok(msg) => handle(msg),
///         Err(Error::Eof) => break,
///         Err(e) => return Err(e),
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Lifecycle ====================
    /// Operation attempted before `init`
    #[error("{what} is not initialised")]
    NotInitialized { what: String },

    /// `init` called twice
    #[error("cannot initialise {what} twice")]
    AlreadyInitialized { what: String },

    /// The direction or stream has been closed
    #[error("already closed: {reason}")]
    AlreadyClosed { reason: String },

    // ==================== Stream End ====================
    /// The remote end finished sending; no further data will arrive
    #[error("EOF")]
    Eof,

    // ==================== Wire ====================
    /// A wire value did not have the expected shape
    #[error("failed to decode field {field}: expected {expected}, found {actual}")]
    Decode {
        field: String,
        expected: String,
        actual: String,
    },

    // ==================== Transport ====================
    /// Socket error or unclean close
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// Unary call returned a non-success status
    #[error("HTTP status {status}: {reason}")]
    Http { status: u16, reason: String },

    // ==================== Sequencing ====================
    /// Failure raised inside a sequenced operation
    #[error("operation failed: {reason}")]
    Operation { reason: String },

    // ==================== Usage ====================
    /// Feature deliberately not supported
    #[error("{what} not implemented")]
    Unsupported { what: String },

    /// Invalid argument or configuration
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl Error {
    /// Create a `NotInitialized` error
    pub fn not_initialized(what: impl Into<String>) -> Self {
        Error::NotInitialized { what: what.into() }
    }

    /// Create an `AlreadyInitialized` error
    pub fn already_initialized(what: impl Into<String>) -> Self {
        Error::AlreadyInitialized { what: what.into() }
    }

    /// Create an `AlreadyClosed` error
    pub fn already_closed(reason: impl Into<String>) -> Self {
        Error::AlreadyClosed {
            reason: reason.into(),
        }
    }

    /// Create a `Decode` error
    pub fn decode(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Error::Decode {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a `Transport` error
    pub fn transport(reason: impl Into<String>) -> Self {
        Error::Transport {
            reason: reason.into(),
        }
    }

    /// Create an `Operation` error
    pub fn operation(reason: impl Into<String>) -> Self {
        Error::Operation {
            reason: reason.into(),
        }
    }

    /// Create an `Unsupported` error
    pub fn unsupported(what: impl Into<String>) -> Self {
        Error::Unsupported { what: what.into() }
    }

    /// Create an `InvalidInput` error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// True for the benign end-of-stream condition
    pub fn is_eof(&self) -> bool {
        matches!(self, Error::Eof)
    }

    /// True if already-buffered messages must still be delivered before
    /// this error surfaces to a receiver.
    ///
    /// Only terminal conditions reported by the remote side qualify; a local
    /// close or a lifecycle misuse fails immediately.
    pub fn is_drainable(&self) -> bool {
        matches!(self, Error::Eof | Error::Transport { .. })
    }

    /// Prefix the field path of a `Decode` error with `parent`.
    ///
    /// Other variants are returned unchanged.
    pub fn within(self, parent: &str) -> Self {
        match self {
            Error::Decode {
                field,
                expected,
                actual,
            } => {
                let field = if field.starts_with('[') {
                    format!("{}{}", parent, field)
                } else {
                    format!("{}.{}", parent, field)
                };
                Error::Decode {
                    field,
                    expected,
                    actual,
                }
            }
            other => other,
        }
    }
}
