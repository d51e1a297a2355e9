//! Batch ingestion of raw book records into the catalog.
//!
//! A [`Pipeline`] validates every record, stores the valid ones, renumbers
//! the categories once the batch is exhausted and reports what happened.
//! Records come from anywhere that yields [`RawRecord`]s; the [`source`]
//! module reads them from JSON files and saved product pages.
//!
//! [`RawRecord`]: tomes_extract::RawRecord

pub mod error;
mod pipeline;
mod report;
pub mod source;

pub use crate::pipeline::Pipeline;
pub use crate::report::Report;
pub use crate::source::{Source, records};
