use exn::ResultExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Rating;
use crate::error::{ErrorKind, Result};

/// Unvalidated record as produced by an extraction step.
///
/// Every field is free-form JSON: scrapers emit strings, spreadsheets emit
/// numbers, and either may be missing. Keys are accepted in English or as
/// the Portuguese column headers of the original spreadsheets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawRecord {
    #[serde(alias = "Título", alias = "Titulo", skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(alias = "Preço (£)", alias = "Preço", alias = "Preco", skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,
    #[serde(alias = "Quantidade", skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(alias = "Avaliação", alias = "Avaliacao", skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(alias = "Categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
}
impl RawRecord {
    /// Decode a raw record from an arbitrary JSON value (normally an object).
    pub fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).or_raise(|| ErrorKind::MalformedRecord)
    }

    /// Decode a list of raw records from a JSON array document.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        serde_json::from_str(json).or_raise(|| ErrorKind::MalformedRecord)
    }
}

/// A normalized, validated book ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub title: String,
    /// Always finite and strictly positive.
    pub price: f64,
    /// At most `i64::MAX`, the largest quantity the catalog can store.
    pub quantity: u64,
    pub rating: Rating,
    pub category: String,
}
