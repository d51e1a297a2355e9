//! Book storage and catalog-wide statistics.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::indicators::{Indicators, RatingDistribution, Thresholds};
use crate::models::{Book, BookRow};
use crate::registry::resolve_with;
use exn::ResultExt;
use sqlx::SqlitePool;
use time::UtcDateTime;
use tomes_extract::BookRecord;
use tracing::instrument;

/// Store for validated books.
///
/// Titles are unique: the first record with a given title wins, and every
/// later one is dropped without touching the stored row.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}
impl From<&Database> for Store {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Store {
    /// Store a book, unless one with the same title already exists.
    ///
    /// The category is resolved (and created if new) first. If the title is
    /// new, the book is inserted and its category's counter is incremented
    /// by exactly one; all of that happens in a single transaction, so a
    /// stored book and its counter increment are never seen apart.
    ///
    /// Returns `true` if the book was inserted, `false` if the title was
    /// already present (the category still exists afterwards, with its
    /// counter untouched).
    #[instrument(level = "debug", skip(self, record), fields(title = %record.title))]
    pub async fn put(&self, record: &BookRecord) -> Result<bool> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let category_id = resolve_with(&mut tx, &record.category).await?;
        let inserted = sqlx::query(include_str!("../queries/insert_book.sql"))
            .bind(&record.title)
            .bind(record.price)
            .bind(i64::try_from(record.quantity).or_raise(|| ErrorKind::InvalidData("quantity"))?)
            .bind(i64::from(record.rating.stars()))
            .bind(i64::from(category_id))
            .bind(UtcDateTime::now().unix_timestamp())
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected()
            > 0;
        if inserted {
            sqlx::query(include_str!("../queries/increment_category.sql"))
                .bind(i64::from(category_id))
                .execute(&mut *tx)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        Ok(inserted)
    }

    pub async fn get_by_title(&self, title: &str) -> Result<Option<Book>> {
        let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/get_book_by_title.sql"))
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Book::try_from).transpose()
    }

    /// List all books ordered by title.
    pub async fn list(&self) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Book::try_from).collect()
    }

    /// List the books of one category ordered by title.
    ///
    /// An unknown category simply has no books.
    pub async fn list_in_category(&self, category_id: u32) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books_in_category.sql"))
            .bind(i64::from(category_id))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Book::try_from).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_books.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("book count"))
    }

    /// Compute the summary indicators over every stored book.
    #[instrument(level = "debug", skip(self))]
    pub async fn indicators(&self, thresholds: &Thresholds) -> Result<Indicators> {
        let well_rated = i64::from(thresholds.well_rated_min.stars());
        let (total, well_rated_count, critical_stock, mean_price): (i64, i64, i64, Option<f64>) =
            sqlx::query_as(include_str!("../queries/indicators.sql"))
                .bind(well_rated)
                // Every stored quantity fits in an i64, so a larger threshold matches them all.
                .bind(i64::try_from(thresholds.critical_stock_max).unwrap_or(i64::MAX))
                .bind(well_rated)
                .fetch_one(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
        Ok(Indicators::from_counts(
            u64::try_from(total).or_raise(|| ErrorKind::InvalidData("book count"))?,
            u64::try_from(well_rated_count).or_raise(|| ErrorKind::InvalidData("well rated count"))?,
            u64::try_from(critical_stock).or_raise(|| ErrorKind::InvalidData("critical stock count"))?,
            mean_price,
        ))
    }

    /// Count the stored books per rating.
    pub async fn rating_distribution(&self) -> Result<RatingDistribution> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(include_str!("../queries/rating_distribution.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let mut distribution = RatingDistribution::default();
        for (rating, books) in rows {
            let rating = u8::try_from(rating).or_raise(|| ErrorKind::InvalidData("rating"))?;
            let books = u64::try_from(books).or_raise(|| ErrorKind::InvalidData("book count"))?;
            distribution.set(rating, books);
        }
        Ok(distribution)
    }
}
