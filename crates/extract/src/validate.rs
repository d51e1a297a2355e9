//! Normalization of raw records into [`BookRecord`]s.

use exn::{OptionExt, ResultExt};
use serde_json::Value;
use tracing::instrument;

use crate::error::{ErrorKind, Result, ValidationError};
use crate::models::{BookRecord, Rating, RawRecord};

/// Category assigned to records that arrive without one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

const CURRENCY_SYMBOLS: &[char] = &['£', '$', '€'];

/// Validates and normalizes a single raw record.
///
/// Pure: nothing is logged or stored here. The caller decides what to do
/// with a rejection (the ingestion pipeline counts it and moves on).
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the first offending field when:
/// - the title is missing, not text, or blank after trimming;
/// - the price is missing, unparseable, non-finite, or not strictly positive;
/// - the quantity is missing, not an integer, or negative;
/// - the rating is missing or not an integer within `1..=5`.
#[instrument(level = "trace", skip(raw))]
pub fn validate(raw: &RawRecord, default_category: &str) -> std::result::Result<BookRecord, ValidationError> {
    Ok(BookRecord {
        title: title(raw.title.as_ref())?,
        price: price(raw.price.as_ref())?,
        quantity: quantity(raw.quantity.as_ref())?,
        rating: rating(raw.rating.as_ref())?,
        category: category(raw.category.as_ref()).unwrap_or_else(|| default_category.to_string()),
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn title(value: Option<&Value>) -> Result<String> {
    let title = match value.ok_or_raise(|| ErrorKind::MissingField("title"))? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => exn::bail!(ErrorKind::ParseError {
            field: "title",
            value: describe(other),
        }),
    };
    if title.is_empty() {
        exn::bail!(ErrorKind::MissingField("title"));
    }
    Ok(title)
}

fn price(value: Option<&Value>) -> Result<f64> {
    let value = value.ok_or_raise(|| ErrorKind::MissingField("price"))?;
    let price = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches(CURRENCY_SYMBOLS).trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|p| p.is_finite())
    .ok_or_raise(|| ErrorKind::ParseError {
        field: "price",
        value: describe(value),
    })?;
    if price <= 0.0 {
        exn::bail!(ErrorKind::OutOfRange {
            field: "price",
            value: describe(value),
        });
    }
    Ok(price)
}

/// Parses an integral JSON value within `i64`; `3.0` (or `"3.0"`) is
/// integral, `3.5` is not.
fn integer(value: &Value, field: &'static str) -> Result<i64> {
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
        },
        _ => None,
    };
    parsed.ok_or_raise(|| ErrorKind::ParseError {
        field,
        value: describe(value),
    })
}

fn integral(f: f64) -> Option<i64> {
    // `i64::MAX as f64` is 2^63, one past the largest i64.
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn quantity(value: Option<&Value>) -> Result<u64> {
    let value = value.ok_or_raise(|| ErrorKind::MissingField("quantity"))?;
    let quantity = integer(value, "quantity")?;
    u64::try_from(quantity).or_raise(|| ErrorKind::OutOfRange {
        field: "quantity",
        value: describe(value),
    })
}

fn rating(value: Option<&Value>) -> Result<Rating> {
    let value = value.ok_or_raise(|| ErrorKind::MissingField("rating"))?;
    // Star words ("Three") as well as digits.
    if let Some(rating) = value.as_str().and_then(Rating::from_word) {
        return Ok(rating);
    }
    Rating::try_from(integer(value, "rating")?)
}

fn category(value: Option<&Value>) -> Option<String> {
    let category = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!category.is_empty()).then_some(category)
}
