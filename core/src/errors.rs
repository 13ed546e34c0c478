//! Error definitions shared by both shuru crates.

use thiserror::Error;

/// A specialized Result type for shuru operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The error type surfaced by library operations.
///
/// Scoring never fails: missing history entries count as zero and missing
/// language-model entries score at the unknown floor. Errors are reserved for
/// persistence, malformed on-disk data and malformed caller input.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying stream could not read or write the requested bytes.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed counts, length fields or serialized blobs in persisted data.
    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    /// Segment-graph merge was attempted on an input that is not a prefix
    /// extension of the existing one.
    #[error("cannot merge: {0:?} does not extend {1:?}")]
    InvalidMerge(String, String),

    /// Caller-supplied input violated the contract (e.g. non-ASCII keystrokes).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    pub(crate) fn format<S: Into<String>>(msg: S) -> Self {
        Error::InvalidFormat(msg.into())
    }
}

/// Split a bincode failure into its i/o and malformed-data halves.
pub(crate) fn from_bincode(e: bincode::Error) -> Error {
    match *e {
        bincode::ErrorKind::Io(io) => Error::Io(io),
        other => Error::InvalidFormat(other.to_string()),
    }
}
