use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::MasterError;
use crate::fte::FteThresholds;
use crate::postcode::MatchStrategy;
use crate::schema;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Everything BUILD_MASTER / LOAD_MASTER need besides the data itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    pub layout: MasterLayout,
    pub build: BuildOptions,
    pub fte: FteThresholds,
}

impl MasterConfig {
    pub fn validate(&self) -> Result<(), MasterError> {
        self.layout.validate()?;
        self.fte.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub match_strategy: MatchStrategy,
    /// Drop organizations without any `Is_*` care-type flag set.
    pub require_care_type: bool,
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Where each Master column comes from in a DigiMV part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterLayout {
    /// Sheet holding one row per organization. Required in every part.
    pub base_sheet: String,
    /// Column joining secondary sheets onto the base sheet.
    pub key_column: String,
    /// Identifying base-sheet columns; absence is a `MissingColumn` error.
    pub required_columns: Vec<String>,
    pub columns: Vec<ColumnSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub output: String,
    pub sheet: String,
    pub column: String,
    #[serde(default)]
    pub transform: Transform,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    #[default]
    None,
    /// "ja" → true, "nee" → false, anything else unset.
    JaNee,
    /// Numbers pass through, text parsed as decimal.
    Number,
}

impl ColumnSpec {
    fn new(output: &str, sheet: &str, column: &str, transform: Transform) -> Self {
        Self {
            output: output.to_string(),
            sheet: sheet.to_string(),
            column: column.to_string(),
            transform,
        }
    }
}

const BASE_SHEET: &str = "RowData_01";
const TYPE_SHEET: &str = "RowData_09";
const FINANCE_SHEET: &str = "RowData_10";
const STAFF_SHEET: &str = "RowData_15";
const ABSENCE_SHEET: &str = "RowData_16";

impl Default for MasterLayout {
    /// The DigiMV annual-disclosure layout.
    fn default() -> Self {
        use Transform::{JaNee, Number};

        let columns = vec![
            // basis
            ColumnSpec::new(schema::CODE, BASE_SHEET, "Code", Transform::None),
            ColumnSpec::new(schema::NAME, BASE_SHEET, "Name", Transform::None),
            ColumnSpec::new(schema::KVK, BASE_SHEET, "qNawKvk", Transform::None),
            ColumnSpec::new("Straat", BASE_SHEET, "Street", Transform::None),
            ColumnSpec::new("Huisnummer", BASE_SHEET, "HouseNumber", Transform::None),
            ColumnSpec::new(schema::POSTCODE, BASE_SHEET, "PostalCode", Transform::None),
            ColumnSpec::new(schema::PLACE, BASE_SHEET, "Town", Transform::None),
            // type
            ColumnSpec::new(schema::IS_VVT, TYPE_SHEET, "qTypeWTZaZorg_13", JaNee),
            ColumnSpec::new(schema::IS_GGZ, TYPE_SHEET, "qTypeWTZaZorg_8", JaNee),
            ColumnSpec::new(schema::IS_GHZ, TYPE_SHEET, "qTypeWTZaZorg_10", JaNee),
            ColumnSpec::new(schema::IS_MSI, TYPE_SHEET, "qTypeWTZaZorg_6", JaNee),
            ColumnSpec::new("VVT_Wijkverpleging", TYPE_SHEET, "qTypeWTZaZorgVenV_3", JaNee),
            ColumnSpec::new("VVT_Verpleeghuiszorg", TYPE_SHEET, "qTypeWTZaZorgVenV_4", JaNee),
            ColumnSpec::new("VVT_Crisiszorg", TYPE_SHEET, "qTypeWTZaZorgVenV_2", JaNee),
            ColumnSpec::new("VVT_GRZ", TYPE_SHEET, "qTypeWTZaZorgVenV_5", JaNee),
            // financieel
            ColumnSpec::new(schema::REVENUE_TOTAL, FINANCE_SHEET, "qTotaalBaten_0", Number),
            ColumnSpec::new("Omzet_Vorig_Jaar", FINANCE_SHEET, "qTotaalBaten_1", Number),
            ColumnSpec::new("Omzet_ZVW", FINANCE_SHEET, "qBatenZorgZvw_0", Number),
            ColumnSpec::new("Omzet_WLZ", FINANCE_SHEET, "qBatenZorgWlz_0", Number),
            ColumnSpec::new("Omzet_WMO", FINANCE_SHEET, "qBatenZorgWmo_0", Number),
            // personeel
            ColumnSpec::new(schema::FTE_TOTAL, STAFF_SHEET, "qPersTotTot_AantalFte", Number),
            ColumnSpec::new("FTE_Zorgpersoneel", STAFF_SHEET, "qPersTotZorg_AantalFte", Number),
            ColumnSpec::new("Verzuim_Pct", ABSENCE_SHEET, "qPersVerzuimPct_0", Number),
            ColumnSpec::new("Vacatures", ABSENCE_SHEET, "qPersVacatures_0", Number),
        ];

        Self {
            base_sheet: BASE_SHEET.to_string(),
            key_column: "Code".to_string(),
            required_columns: vec!["Code".into(), "Name".into(), "PostalCode".into()],
            columns,
        }
    }
}

/// Columns the engine appends itself; layouts may not produce them.
const RESERVED_OUTPUTS: [&str; 5] = [
    schema::PART,
    schema::PROVINCE,
    schema::LAT,
    schema::LON,
    schema::FTE_RELIABLE,
];

impl MasterLayout {
    /// Every sheet the layout reads, base sheet first, without duplicates.
    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names = vec![self.base_sheet.as_str()];
        for spec in &self.columns {
            if !names.contains(&spec.sheet.as_str()) {
                names.push(spec.sheet.as_str());
            }
        }
        names
    }

    /// Master columns in output order.
    pub fn output_columns(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.columns.len() + RESERVED_OUTPUTS.len());
        out.push(schema::PART.to_string());
        out.extend(self.columns.iter().map(|c| c.output.clone()));
        out.push(schema::PROVINCE.to_string());
        out.push(schema::FTE_RELIABLE.to_string());
        out.push(schema::LAT.to_string());
        out.push(schema::LON.to_string());
        out
    }

    pub fn validate(&self) -> Result<(), MasterError> {
        if self.base_sheet.trim().is_empty() {
            return Err(MasterError::InvalidConfig("layout.base_sheet is empty".into()));
        }
        if self.key_column.trim().is_empty() {
            return Err(MasterError::InvalidConfig("layout.key_column is empty".into()));
        }
        if self.columns.is_empty() {
            return Err(MasterError::InvalidConfig("layout.columns is empty".into()));
        }

        let mut seen = HashSet::new();
        for spec in &self.columns {
            if spec.output.trim().is_empty() || spec.column.trim().is_empty() || spec.sheet.trim().is_empty() {
                return Err(MasterError::InvalidConfig(format!(
                    "layout column '{}' has an empty output, sheet or column name",
                    spec.output
                )));
            }
            if RESERVED_OUTPUTS.contains(&spec.output.as_str()) {
                return Err(MasterError::InvalidConfig(format!(
                    "layout column '{}' is reserved for engine output",
                    spec.output
                )));
            }
            if !seen.insert(spec.output.as_str()) {
                return Err(MasterError::InvalidConfig(format!(
                    "layout column '{}' appears more than once",
                    spec.output
                )));
            }
        }

        if !seen.contains(schema::POSTCODE) {
            return Err(MasterError::InvalidConfig(format!(
                "layout must produce a '{}' column",
                schema::POSTCODE
            )));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_valid() {
        MasterConfig::default().validate().unwrap();
    }

    #[test]
    fn default_sheet_names_in_order() {
        let layout = MasterLayout::default();
        assert_eq!(
            layout.sheet_names(),
            vec!["RowData_01", "RowData_09", "RowData_10", "RowData_15", "RowData_16"]
        );
    }

    #[test]
    fn output_columns_wrap_layout() {
        let cols = MasterLayout::default().output_columns();
        assert_eq!(cols.first().map(String::as_str), Some("Bron_Part"));
        assert_eq!(cols[1], "Code");
        let tail: Vec<&str> = cols[cols.len() - 4..].iter().map(String::as_str).collect();
        assert_eq!(tail, vec!["Provincie", "FTE_Betrouwbaar", "lat", "lon"]);
        assert_eq!(cols.len(), 24 + 5);
    }

    #[test]
    fn reject_reserved_output() {
        let mut layout = MasterLayout::default();
        layout.columns.push(ColumnSpec::new("lat", "RowData_01", "Latitude", Transform::None));
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn reject_duplicate_output() {
        let mut layout = MasterLayout::default();
        layout.columns.push(ColumnSpec::new("Naam", "RowData_01", "Name", Transform::None));
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn reject_layout_without_postcode() {
        let mut layout = MasterLayout::default();
        layout.columns.retain(|c| c.output != "Postcode");
        let err = layout.validate().unwrap_err();
        assert!(err.to_string().contains("'Postcode'"));
    }
}
