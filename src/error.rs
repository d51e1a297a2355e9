//! Command-line Error Types

use derive_more::{Display, Error};

/// A command-line error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for command-line operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("could not prepare the database location")]
    Io,
    #[display("catalog operation failed")]
    Catalog,
    #[display("could not open record source")]
    Source,
    #[display("ingestion failed")]
    Ingest,
    #[display("could not render output")]
    Output,
}
