use serde::{Deserialize, Serialize};

use crate::error::MasterError;
use crate::schema;
use crate::table::{Table, Value};

/// Revenue-per-FTE band considered plausible. Outside the band the FTE
/// figure is flagged unreliable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FteThresholds {
    pub min_revenue_per_fte: f64,
    pub max_revenue_per_fte: f64,
}

impl Default for FteThresholds {
    fn default() -> Self {
        Self {
            min_revenue_per_fte: 20_000.0,
            max_revenue_per_fte: 100_000.0,
        }
    }
}

impl FteThresholds {
    pub fn validate(&self) -> Result<(), MasterError> {
        if !(self.min_revenue_per_fte.is_finite() && self.max_revenue_per_fte.is_finite()) {
            return Err(MasterError::InvalidConfig("fte thresholds must be finite".into()));
        }
        if self.min_revenue_per_fte < 0.0 {
            return Err(MasterError::InvalidConfig(
                "fte.min_revenue_per_fte must not be negative".into(),
            ));
        }
        if self.min_revenue_per_fte > self.max_revenue_per_fte {
            return Err(MasterError::InvalidConfig(format!(
                "fte.min_revenue_per_fte ({}) exceeds fte.max_revenue_per_fte ({})",
                self.min_revenue_per_fte, self.max_revenue_per_fte
            )));
        }
        Ok(())
    }

    /// `None` when either figure is unknown or FTE is zero.
    pub fn is_reliable(&self, revenue: Option<f64>, fte: Option<f64>) -> Option<bool> {
        let (revenue, fte) = (revenue?, fte?);
        if fte == 0.0 {
            return None;
        }
        let per_fte = revenue / fte;
        Some(self.min_revenue_per_fte <= per_fte && per_fte <= self.max_revenue_per_fte)
    }
}

/// (Re)compute the `FTE_Betrouwbaar` column for every row.
pub fn apply_fte_flag(table: &mut Table, thresholds: &FteThresholds) {
    let flag_col = table.ensure_column(schema::FTE_RELIABLE);
    let revenue_col = table.column_index(schema::REVENUE_TOTAL);
    let fte_col = table.column_index(schema::FTE_TOTAL);

    for row in 0..table.len() {
        let revenue = revenue_col.and_then(|c| table.cell(row, c).as_f64());
        let fte = fte_col.and_then(|c| table.cell(row, c).as_f64());
        let flag = thresholds.is_reliable(revenue, fte);
        table.set(row, flag_col, Value::from(flag));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_is_inclusive() {
        let t = FteThresholds::default();
        assert_eq!(t.is_reliable(Some(2_000_000.0), Some(100.0)), Some(true));
        assert_eq!(t.is_reliable(Some(10_000_000.0), Some(100.0)), Some(true));
        assert_eq!(t.is_reliable(Some(1_000_000.0), Some(100.0)), Some(false));
        assert_eq!(t.is_reliable(Some(20_000_000.0), Some(100.0)), Some(false));
    }

    #[test]
    fn unknown_or_zero_fte_is_unset() {
        let t = FteThresholds::default();
        assert_eq!(t.is_reliable(None, Some(10.0)), None);
        assert_eq!(t.is_reliable(Some(1.0), None), None);
        assert_eq!(t.is_reliable(Some(1.0), Some(0.0)), None);
    }

    #[test]
    fn apply_adds_flag_column() {
        let mut table = Table::from_rows(
            [schema::REVENUE_TOTAL, schema::FTE_TOTAL],
            vec![
                vec![Value::Number(5_000_000.0), Value::Number(100.0)],
                vec![Value::Number(5_000_000.0), Value::Empty],
            ],
        );
        apply_fte_flag(&mut table, &FteThresholds::default());
        assert_eq!(table.get(0, schema::FTE_RELIABLE), &Value::Bool(true));
        assert_eq!(table.get(1, schema::FTE_RELIABLE), &Value::Empty);
    }

    #[test]
    fn reject_inverted_band() {
        let t = FteThresholds {
            min_revenue_per_fte: 10.0,
            max_revenue_per_fte: 1.0,
        };
        assert!(t.validate().is_err());
    }
}
