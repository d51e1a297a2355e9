use crate::error::{Error, ErrorKind};
use exn::{OptionExt, ResultExt};
use time::UtcDateTime;
use tomes_extract::Rating;

/// A stored book, joined with the name of its category.
#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub quantity: u64,
    pub rating: Rating,
    pub category_id: u32,
    pub category: String,
    pub ingested_at: UtcDateTime,
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    id: i64,
    title: String,
    price: f64,
    quantity: i64,
    rating: i64,
    category_id: i64,
    category: String,
    ingested_at: i64,
}
impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: u64::try_from(row.id).or_raise(|| ErrorKind::InvalidData("book id"))?,
            title: row.title,
            price: Some(row.price)
                .filter(|p| p.is_finite() && *p > 0.0)
                .ok_or_raise(|| ErrorKind::InvalidData("price"))?,
            quantity: u64::try_from(row.quantity).or_raise(|| ErrorKind::InvalidData("quantity"))?,
            rating: Rating::try_from(row.rating).or_raise(|| ErrorKind::InvalidData("rating"))?,
            category_id: u32::try_from(row.category_id).or_raise(|| ErrorKind::InvalidData("category id"))?,
            category: row.category,
            ingested_at: UtcDateTime::from_unix_timestamp(row.ingested_at)
                .or_raise(|| ErrorKind::InvalidData("ingestion date"))?,
        })
    }
}
