//! SQLite catalog of books and their categories.
//!
//! # Architecture
//! The catalog stores two related entity types:
//! - **Categories**: unique names mapped to small integer identifiers, each
//!   with a counter of the books stored under it. Identifiers are renumbered
//!   by [`Registry::compact`] into a dense sequence ordered by name.
//! - **Books**: validated records keyed by their unique title, each
//!   referencing exactly one category. Books are written once and never
//!   updated.
//!
//! Open a [`Database`], then use its [`Registry`] for categories and its
//! [`Store`] for books and statistics.

mod db;
pub mod error;
mod indicators;
mod models;
mod registry;
mod store;

pub use crate::db::Database;
pub use crate::indicators::{Indicators, RatingDistribution, Thresholds};
pub use crate::models::{Book, Category};
pub use crate::registry::Registry;
pub use crate::store::Store;
