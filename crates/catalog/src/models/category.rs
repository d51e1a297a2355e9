use crate::error::{Error, ErrorKind};
use exn::ResultExt;

/// A category as stored, along with how many books reference it right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: String,
    /// Books successfully stored under this category over the catalog's lifetime.
    pub occurrences: u64,
    /// Books currently referencing this category.
    pub books: u64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct CategoryRow {
    id: i64,
    name: String,
    occurrences: i64,
    books: i64,
}
impl TryFrom<CategoryRow> for Category {
    type Error = Error;
    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: u32::try_from(row.id).or_raise(|| ErrorKind::InvalidData("category id"))?,
            name: row.name,
            occurrences: u64::try_from(row.occurrences).or_raise(|| ErrorKind::InvalidData("category occurrences"))?,
            books: u64::try_from(row.books).or_raise(|| ErrorKind::InvalidData("book count"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_to_model() {
        let row = CategoryRow { id: 3, name: "Poetry".to_string(), occurrences: 2, books: 2 };
        let category = Category::try_from(row).unwrap();
        assert_eq!(category.id, 3);
        assert_eq!(category.occurrences, 2);
    }

    #[test]
    fn test_negative_id_is_invalid() {
        // Only visible mid-compaction; never outside of its transaction.
        let row = CategoryRow { id: -3, name: "Poetry".to_string(), occurrences: 0, books: 0 };
        let err = Category::try_from(row).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("category id"));
    }
}
