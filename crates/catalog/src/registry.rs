//! Category registry: name to identifier resolution and compaction.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{Category, CategoryRow};
use exn::ResultExt;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::instrument;

/// Resolves a category name to its identifier, creating the category with a
/// zero counter if it doesn't exist yet.
///
/// Never touches the counter of an existing category; see
/// [`Store::put`](crate::Store::put) for where counters are incremented.
pub(crate) async fn resolve_with(conn: &mut SqliteConnection, name: &str) -> Result<u32> {
    let created = sqlx::query(include_str!("../queries/insert_category.sql"))
        .bind(name)
        .execute(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    if created.rows_affected() > 0 {
        tracing::debug!(category = name, "created category");
    }
    let id: i64 = sqlx::query_scalar(include_str!("../queries/get_category_id.sql"))
        .bind(name)
        .fetch_one(&mut *conn)
        .await
        .or_raise(|| ErrorKind::Database)?;
    u32::try_from(id).or_raise(|| ErrorKind::InvalidData("category id"))
}

/// Registry of category names and their small-integer identifiers.
///
/// Identifiers are only stable between two compactions: [`compact`](Self::compact)
/// renumbers every category into `1..=N` by ascending name.
#[derive(Debug, Clone)]
pub struct Registry {
    pool: SqlitePool,
}
impl From<&Database> for Registry {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl Registry {
    /// Return the identifier for `name`, creating the category (with a zero
    /// counter) on first sighting.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, name: &str) -> Result<u32> {
        let mut conn = self.pool.acquire().await.or_raise(|| ErrorKind::Database)?;
        resolve_with(&mut conn, name).await
    }

    /// Renumber categories into a dense `1..=N` sequence ordered by name
    /// (case-sensitive, byte order), rewriting every book's reference.
    ///
    /// Names and counters are preserved. The whole remap runs in a single
    /// transaction: it either completes, or nothing of it is visible. Book
    /// references follow their category through `ON UPDATE CASCADE`, and a
    /// foreign key check runs before committing.
    ///
    /// Returns the number of categories renumbered.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Integrity`] if any book would be left without a category.
    /// - [`ErrorKind::Database`] for any other failure.
    ///
    /// In both cases the transaction is rolled back.
    #[instrument(skip(self))]
    pub async fn compact(&self) -> Result<u64> {
        let mut tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        let moved = sqlx::query(include_str!("../queries/compact_negate_ids.sql"))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?
            .rows_affected();
        sqlx::query(include_str!("../queries/compact_rank_ids.sql"))
            .execute(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let violations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pragma_foreign_key_check")
            .fetch_one(&mut *tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        if violations > 0 {
            // Dropping `tx` rolls the remap back.
            exn::bail!(ErrorKind::Integrity(violations.unsigned_abs()));
        }
        tx.commit().await.or_raise(|| ErrorKind::Database)?;
        tracing::info!(categories = moved, "compacted category identifiers");
        Ok(moved)
    }

    pub async fn get(&self, id: u32) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(include_str!("../queries/get_category.sql"))
            .bind(i64::from(id))
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Category::try_from).transpose()
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Category>> {
        let row: Option<CategoryRow> = sqlx::query_as(include_str!("../queries/get_category_by_name.sql"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        row.map(Category::try_from).transpose()
    }

    /// List all categories ordered by name, with their live book counts.
    pub async fn list(&self) -> Result<Vec<Category>> {
        let rows: Vec<CategoryRow> = sqlx::query_as(include_str!("../queries/list_categories.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Category::try_from).collect()
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(include_str!("../queries/count_categories.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("category count"))
    }
}
