//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Every error in this crate is a storage-class failure: a duplicate title
//! is *not* an error, it's reported as `Ok(false)` by
//! [`Store::put`](crate::Store::put).

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The database could not be opened, queried or written to.
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// A write would have left (or found) books referencing missing categories.
    #[display("referential integrity violated: {_0} dangling reference(s)")]
    Integrity(#[error(not(source))] u64),
    /// A stored value could not be converted into its model type.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // SQLITE_BUSY and friends surface as `Database`.
        matches!(self, Self::Database)
    }
}
