mod book;
mod category;

pub use self::book::Book;
pub(crate) use self::book::BookRow;
pub use self::category::Category;
pub(crate) use self::category::CategoryRow;
