use std::collections::BTreeSet;

use serde::Serialize;

use crate::schema;
use crate::table::Table;

/// Headline figures for a (possibly filtered) Master table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MasterSummary {
    pub organizations: usize,
    pub vvt: usize,
    /// Sum of known `Omzet_Totaal` values, euros.
    pub total_revenue: f64,
    /// Sum of known `FTE_Totaal` values.
    pub total_fte: f64,
    pub with_coordinates: usize,
    pub without_coordinates: usize,
    /// Distinct provinces, sorted.
    pub provinces: Vec<String>,
}

pub fn summarize(table: &Table) -> MasterSummary {
    let mut summary = MasterSummary {
        organizations: table.len(),
        ..Default::default()
    };
    let mut provinces = BTreeSet::new();

    for row in 0..table.len() {
        if table.get(row, schema::IS_VVT).as_bool() == Some(true) {
            summary.vvt += 1;
        }
        if let Some(revenue) = table.get(row, schema::REVENUE_TOTAL).as_f64() {
            summary.total_revenue += revenue;
        }
        if let Some(fte) = table.get(row, schema::FTE_TOTAL).as_f64() {
            summary.total_fte += fte;
        }

        let has_lat = table.get(row, schema::LAT).as_f64().is_some();
        let has_lon = table.get(row, schema::LON).as_f64().is_some();
        if has_lat && has_lon {
            summary.with_coordinates += 1;
        } else {
            summary.without_coordinates += 1;
        }

        let province = table.get(row, schema::PROVINCE);
        if !province.is_empty() {
            provinces.insert(province.display());
        }
    }

    summary.provinces = provinces.into_iter().collect();
    summary
}
