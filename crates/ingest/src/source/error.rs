//! Error types for the [`source`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A record source error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for record source operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a record source failure.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The path doesn't exist or can't be inspected.
    #[display("record source not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// Neither a directory nor a file with a known extension.
    #[display("unsupported record source: {}", _0.display())]
    Unsupported(#[error(not(source))] PathBuf),
    /// Reading a file or listing a directory failed.
    #[display("could not read {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// A JSON document is not an array of records.
    #[display("malformed JSON document: {}", _0.display())]
    Json(#[error(not(source))] PathBuf),
    /// One entry of a JSON array or line of a JSON lines file is not a record.
    #[display("malformed record #{index} in {}", path.display())]
    Record { path: PathBuf, index: usize },
    /// A saved page yielded no record.
    #[display("no book found in page {}", _0.display())]
    Page(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
