//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Validation failures and page extraction failures share one error type:
//! both mean "this record never reaches the catalog".

use derive_more::{Display, Error};

/// An extraction or validation error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;
/// Per-record rejection returned by [`validate`](crate::validate).
pub type ValidationError = Error;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTML is not a product page of the catalog site.
    #[display("invalid product page: missing required structure")]
    InvalidDocument,
    /// A required field was absent (or explicitly null).
    #[display("missing required field: {_0}")]
    MissingField(#[error(not(source))] &'static str),
    /// A field was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value, as found.
        value: String,
    },
    /// A field parsed correctly but falls outside its permitted range.
    #[display("field '{field}' out of range, found value: {value}")]
    OutOfRange {
        /// The field that was rejected.
        field: &'static str,
        /// The offending value, as found.
        value: String,
    },
    /// Raw record data (JSON) could not be decoded at all.
    #[display("malformed raw record")]
    MalformedRecord,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A record is either valid or it isn't; retrying changes nothing.
        false
    }

    /// The name of the field this error is about, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingField(field) | Self::ParseError { field, .. } | Self::OutOfRange { field, .. } => Some(field),
            Self::InvalidDocument | Self::MalformedRecord => None,
        }
    }
}
