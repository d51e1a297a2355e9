//! Summary indicators of a catalog.

use serde::Serialize;
use tomes_extract::Rating;

/// Where "well rated" and "critical stock" begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Books rated at least this are well rated.
    pub well_rated_min: Rating,
    /// Books with at most this many copies in stock are in critical stock.
    pub critical_stock_max: u64,
}
impl Thresholds {
    pub const DEFAULT_WELL_RATED_MIN: Rating = match Rating::new(4) {
        Some(rating) => rating,
        None => Rating::MAX,
    };
    pub const DEFAULT_CRITICAL_STOCK_MAX: u64 = 5;
}
impl Default for Thresholds {
    fn default() -> Self {
        Self {
            well_rated_min: Self::DEFAULT_WELL_RATED_MIN,
            critical_stock_max: Self::DEFAULT_CRITICAL_STOCK_MAX,
        }
    }
}

/// Catalog-wide indicators, each rounded to two decimals.
///
/// All three are zero on an empty catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Indicators {
    /// Percentage of books that are well rated.
    #[serde(rename = "percentual_bem_avaliados")]
    pub well_rated_pct: f64,
    /// Percentage of books in critical stock.
    #[serde(rename = "percentual_estoque_critico")]
    pub critical_stock_pct: f64,
    /// Mean price of the well-rated books.
    #[serde(rename = "preco_medio_bem_avaliados")]
    pub well_rated_mean_price: f64,
}
impl Indicators {
    pub(crate) fn from_counts(total: u64, well_rated: u64, critical_stock: u64, mean_price: Option<f64>) -> Self {
        Self {
            well_rated_pct: round2(percentage(well_rated, total)),
            critical_stock_pct: round2(percentage(critical_stock, total)),
            well_rated_mean_price: round2(mean_price.unwrap_or(0.0)),
        }
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64 * 100.0
}

/// Round half to even, so `0.125` becomes `0.12`.
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Number of stored books per star rating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RatingDistribution([u64; 5]);
impl RatingDistribution {
    pub(crate) fn set(&mut self, stars: u8, books: u64) {
        if let Some(rating) = Rating::new(stars) {
            self.0[usize::from(rating.stars() - 1)] = books;
        }
    }

    /// Books with the given number of stars (zero outside `1..=5`).
    pub fn get(&self, stars: u8) -> u64 {
        Rating::new(stars).map(|r| self.0[usize::from(r.stars() - 1)]).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// `(rating, books)` pairs from one star to five.
    pub fn iter(&self) -> impl Iterator<Item = (Rating, u64)> + '_ {
        (1..=5).filter_map(Rating::new).map(|r| (r, self.get(r.stars())))
    }

    /// Share of each rating in percent, rounded to one decimal.
    pub fn percentages(&self) -> [f64; 5] {
        let total = self.total();
        self.0.map(|books| (percentage(books, total) * 10.0).round() / 10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0, None, 0.0, 0.0, 0.0)]
    #[case(1, 1, 0, Some(10.0), 100.0, 0.0, 10.0)]
    #[case(3, 1, 2, Some(51.774), 33.33, 66.67, 51.77)]
    #[case(8, 1, 0, Some(0.125), 12.5, 0.0, 0.12)]
    #[case(8, 1, 0, Some(0.375), 12.5, 0.0, 0.38)]
    #[case(8, 1, 0, Some(0.625), 12.5, 0.0, 0.62)]
    fn test_from_counts(
        #[case] total: u64,
        #[case] well_rated: u64,
        #[case] critical: u64,
        #[case] mean: Option<f64>,
        #[case] expected_well_rated: f64,
        #[case] expected_critical: f64,
        #[case] expected_mean: f64,
    ) {
        let indicators = Indicators::from_counts(total, well_rated, critical, mean);
        assert_eq!(indicators.well_rated_pct, expected_well_rated);
        assert_eq!(indicators.critical_stock_pct, expected_critical);
        assert_eq!(indicators.well_rated_mean_price, expected_mean);
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_value(Indicators::from_counts(1, 1, 0, Some(10.0))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "percentual_bem_avaliados": 100.0,
                "percentual_estoque_critico": 0.0,
                "preco_medio_bem_avaliados": 10.0,
            })
        );
    }

    #[test]
    fn test_distribution() {
        let mut distribution = RatingDistribution::default();
        distribution.set(1, 1);
        distribution.set(4, 3);
        distribution.set(9, 100);
        assert_eq!(distribution.total(), 4);
        assert_eq!(distribution.get(0), 0);
        assert_eq!(distribution.percentages(), [25.0, 0.0, 0.0, 75.0, 0.0]);
        let pairs = distribution.iter().map(|(r, n)| (r.stars(), n)).collect::<Vec<_>>();
        assert_eq!(pairs, vec![(1, 1), (2, 0), (3, 0), (4, 3), (5, 0)]);
    }
}
