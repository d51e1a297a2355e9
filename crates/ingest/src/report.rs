use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use tomes_catalog::Indicators;

/// Outcome of one pipeline run.
///
/// Every input record lands in exactly one of the three counters. The
/// indicators describe the whole catalog after the run, not only the books
/// this run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Report {
    pub inserted: u64,
    pub rejected: u64,
    pub duplicates: u64,
    #[serde(flatten)]
    pub indicators: Indicators,
}
impl Report {
    /// Number of records the run consumed.
    pub fn processed(&self) -> u64 {
        self.inserted + self.rejected + self.duplicates
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "inserted:                {}", self.inserted)?;
        writeln!(f, "duplicates:              {}", self.duplicates)?;
        writeln!(f, "rejected:                {}", self.rejected)?;
        writeln!(f, "well rated (%):          {:.2}", self.indicators.well_rated_pct)?;
        writeln!(f, "critical stock (%):      {:.2}", self.indicators.critical_stock_pct)?;
        write!(f, "well rated mean price:   {:.2}", self.indicators.well_rated_mean_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report {
            inserted: 1,
            rejected: 1,
            duplicates: 1,
            indicators: Indicators {
                well_rated_pct: 100.0,
                critical_stock_pct: 100.0,
                well_rated_mean_price: 10.0,
            },
        }
    }

    #[test]
    fn test_processed() {
        assert_eq!(report().processed(), 3);
        assert_eq!(Report::default().processed(), 0);
    }

    #[test]
    fn test_serialized_flat() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inserted": 1,
                "rejected": 1,
                "duplicates": 1,
                "percentual_bem_avaliados": 100.0,
                "percentual_estoque_critico": 100.0,
                "preco_medio_bem_avaliados": 10.0,
            })
        );
    }

    #[test]
    fn test_display() {
        let text = report().to_string();
        assert!(text.contains("inserted:                1"));
        assert!(text.ends_with("well rated mean price:   10.00"));
    }
}
