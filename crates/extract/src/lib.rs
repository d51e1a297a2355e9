//! Raw book records and how they become [`BookRecord`]s.
//!
//! Extraction (from saved product pages) produces [`RawRecord`]s with
//! free-form fields; [`validate`] turns each one into a normalized
//! [`BookRecord`] or a per-record rejection.

mod consts;
pub mod error;
pub mod models;
mod page;
mod validate;

pub use crate::models::{BookRecord, Rating, RawRecord};
pub use crate::page::{ProductLink, ProductPage, extract, product_links};
pub use crate::validate::{DEFAULT_CATEGORY, validate};
