use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use exn::{OptionExt, ResultExt};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Star rating, always within `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: Rating = Rating(1);
    pub const MAX: Rating = Rating(5);

    pub const fn new(stars: u8) -> Option<Self> {
        if stars >= Self::MIN.0 && stars <= Self::MAX.0 { Some(Self(stars)) } else { None }
    }

    pub const fn stars(&self) -> u8 {
        self.0
    }

    /// Returns the English word used by the catalog site's `star-rating` CSS class.
    pub fn as_word(&self) -> &'static str {
        match self.0 {
            1 => "One",
            2 => "Two",
            3 => "Three",
            4 => "Four",
            _ => "Five",
        }
    }

    /// Parses one of the star words (`One`..`Five`), ignoring case.
    pub fn from_word(word: &str) -> Option<Self> {
        Some(Self(match sanitize(word).as_str() {
            "one" => 1,
            "two" => 2,
            "three" => 3,
            "four" => 4,
            "five" => 5,
            _ => return None,
        }))
    }
}
impl TryFrom<i64> for Rating {
    type Error = Error;
    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value).ok().and_then(Self::new).ok_or_raise(|| ErrorKind::OutOfRange {
            field: "rating",
            value: value.to_string(),
        })
    }
}
impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}
impl FromStr for Rating {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rating) = Self::from_word(s) {
            return Ok(rating);
        }
        let stars = s.trim().parse::<i64>().or_raise(|| ErrorKind::ParseError {
            field: "rating",
            value: s.to_string(),
        })?;
        Self::try_from(stars)
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", 1)]
    #[case(" 5 ", 5)]
    #[case("Three", 3)]
    #[case("four", 4)]
    #[case("FIVE", 5)]
    fn test_parse(#[case] input: &str, #[case] expected: u8) {
        assert_eq!(input.parse::<Rating>().unwrap().stars(), expected);
    }

    #[rstest]
    #[case("0")]
    #[case("6")]
    #[case("-1")]
    #[case("Zero")]
    #[case("3.5")]
    #[case("")]
    fn test_parse_invalid(#[case] input: &str) {
        assert!(input.parse::<Rating>().is_err());
    }

    #[test]
    fn test_out_of_range_kind() {
        let err = Rating::try_from(9_i64).unwrap_err();
        assert!(matches!(*err, ErrorKind::OutOfRange { field: "rating", .. }));
    }

    #[test]
    fn test_word_round_trip() {
        for stars in 1..=5 {
            let rating = Rating::new(stars).unwrap();
            assert_eq!(Rating::from_word(rating.as_word()), Some(rating));
        }
    }
}
