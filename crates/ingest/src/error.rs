//! Ingestion Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Only catalog failures end a run. A record that fails validation, or that
//! duplicates a stored title, is counted in the [`Report`](crate::Report)
//! instead.

use derive_more::{Display, Error};

/// An ingestion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Storing a book, compacting categories or computing the indicators
    /// failed. Compaction is atomic, so none of it is visible.
    #[display("catalog operation failed")]
    Catalog,
    /// A record source could not be opened.
    #[display("issue with record source")]
    Source,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Catalog => true,
            Self::Source => false,
        }
    }
}
