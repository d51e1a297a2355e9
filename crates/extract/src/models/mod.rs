mod rating;
mod record;

pub use self::rating::Rating;
pub use self::record::{BookRecord, RawRecord};

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace('-', "").replace('_', "").replace(' ', "")
}
