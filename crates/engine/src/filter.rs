// Post-build filtering. Each predicate is a pure function over one row;
// `MasterFilter` ANDs the active ones.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema;
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CareType {
    Vvt,
    Ggz,
    Ghz,
    Msi,
}

impl CareType {
    pub const ALL: [CareType; 4] = [CareType::Vvt, CareType::Ggz, CareType::Ghz, CareType::Msi];

    /// Master flag column for this type.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Vvt => schema::IS_VVT,
            Self::Ggz => schema::IS_GGZ,
            Self::Ghz => schema::IS_GHZ,
            Self::Msi => schema::IS_MSI,
        }
    }
}

impl std::fmt::Display for CareType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vvt => write!(f, "VVT"),
            Self::Ggz => write!(f, "GGZ"),
            Self::Ghz => write!(f, "GHZ"),
            Self::Msi => write!(f, "MSI"),
        }
    }
}

impl FromStr for CareType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VVT" => Ok(Self::Vvt),
            "GGZ" => Ok(Self::Ggz),
            "GHZ" => Ok(Self::Ghz),
            "MSI" => Ok(Self::Msi),
            other => Err(format!("unknown care type '{other}' (expected VVT, GGZ, GHZ or MSI)")),
        }
    }
}

/// View filter over a Master table. Default = everything passes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterFilter {
    /// Case-insensitive substring of name or place, or substring of KVK.
    pub search: Option<String>,
    /// Row passes if any selected type flag is true. Empty = no filter.
    pub care_types: Vec<CareType>,
    /// Row passes if its province is one of these. Empty = no filter.
    pub provinces: Vec<String>,
    /// Inclusive revenue bounds in euros.
    pub revenue_min: Option<f64>,
    pub revenue_max: Option<f64>,
    pub reliable_fte_only: bool,
}

impl MasterFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, table: &Table, row: usize) -> bool {
        matches_search(table, row, self.search.as_deref())
            && matches_care_types(table, row, &self.care_types)
            && matches_province(table, row, &self.provinces)
            && matches_revenue(table, row, self.revenue_min, self.revenue_max)
            && matches_reliable_fte(table, row, self.reliable_fte_only)
    }

    pub fn apply(&self, table: &Table) -> Table {
        if self.is_empty() {
            return table.clone();
        }
        let filtered = table.filter_rows(|t, row| self.matches(t, row));
        tracing::debug!(before = table.len(), after = filtered.len(), "filter applied");
        filtered
    }
}

pub fn matches_search(table: &Table, row: usize, search: Option<&str>) -> bool {
    let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    let contains_ci = |col: &str| table.get(row, col).display().to_lowercase().contains(&needle);

    contains_ci(schema::NAME)
        || contains_ci(schema::PLACE)
        || table.get(row, schema::KVK).display().contains(&needle)
}

pub fn matches_care_types(table: &Table, row: usize, types: &[CareType]) -> bool {
    types.is_empty()
        || types
            .iter()
            .any(|t| table.get(row, t.column()).as_bool() == Some(true))
}

pub fn matches_province(table: &Table, row: usize, provinces: &[String]) -> bool {
    if provinces.is_empty() {
        return true;
    }
    let value = table.get(row, schema::PROVINCE);
    !value.is_empty() && provinces.iter().any(|p| *p == value.display())
}

/// Rows with unknown revenue fail any active bound.
pub fn matches_revenue(table: &Table, row: usize, min: Option<f64>, max: Option<f64>) -> bool {
    if min.is_none() && max.is_none() {
        return true;
    }
    let Some(revenue) = table.get(row, schema::REVENUE_TOTAL).as_f64() else {
        return false;
    };
    min.map_or(true, |m| revenue >= m) && max.map_or(true, |m| revenue <= m)
}

pub fn matches_reliable_fte(table: &Table, row: usize, only_reliable: bool) -> bool {
    !only_reliable || table.get(row, schema::FTE_RELIABLE).as_bool() == Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn sample() -> Table {
        Table::from_rows(
            ["Naam", "Plaats", "KVK", "Provincie", "Omzet_Totaal", "Is_VVT", "Is_GGZ", "FTE_Betrouwbaar"],
            vec![
                vec![
                    Value::from("Zorggroep Almere"),
                    Value::from("Almere"),
                    Value::from("39012345"),
                    Value::from("Flevoland"),
                    Value::Number(120_000_000.0),
                    Value::Bool(true),
                    Value::Bool(false),
                    Value::Bool(true),
                ],
                vec![
                    Value::from("GGZ Noord"),
                    Value::from("Groningen"),
                    Value::Number(41012345.0),
                    Value::from("Groningen"),
                    Value::Number(8_000_000.0),
                    Value::Bool(false),
                    Value::Bool(true),
                    Value::Bool(false),
                ],
                vec![
                    Value::from("Thuiszorg Zuid"),
                    Value::from("Maastricht"),
                    Value::Empty,
                    Value::Empty,
                    Value::Empty,
                    Value::Empty,
                    Value::Empty,
                    Value::Empty,
                ],
            ],
        )
    }

    fn names(table: &Table) -> Vec<String> {
        table.column_values("Naam").iter().map(|v| v.display()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let t = sample();
        assert_eq!(MasterFilter::default().apply(&t), t);
    }

    #[test]
    fn search_name_place_and_kvk() {
        let t = sample();
        let by_name = MasterFilter { search: Some("noord".into()), ..Default::default() };
        assert_eq!(names(&by_name.apply(&t)), vec!["GGZ Noord"]);

        let by_place = MasterFilter { search: Some("MAASTRICHT".into()), ..Default::default() };
        assert_eq!(names(&by_place.apply(&t)), vec!["Thuiszorg Zuid"]);

        let by_kvk = MasterFilter { search: Some("4101".into()), ..Default::default() };
        assert_eq!(names(&by_kvk.apply(&t)), vec!["GGZ Noord"]);
    }

    #[test]
    fn care_type_is_any_of() {
        let t = sample();
        let f = MasterFilter { care_types: vec![CareType::Ggz], ..Default::default() };
        assert_eq!(names(&f.apply(&t)), vec!["GGZ Noord"]);

        let f = MasterFilter { care_types: vec![CareType::Vvt, CareType::Ggz], ..Default::default() };
        assert_eq!(f.apply(&t).len(), 2);
    }

    #[test]
    fn province_equality() {
        let t = sample();
        let f = MasterFilter { provinces: vec!["Flevoland".into()], ..Default::default() };
        assert_eq!(names(&f.apply(&t)), vec!["Zorggroep Almere"]);
    }

    #[test]
    fn revenue_range_inclusive_and_unknown_excluded() {
        let t = sample();
        let f = MasterFilter {
            revenue_min: Some(8_000_000.0),
            revenue_max: Some(8_000_000.0),
            ..Default::default()
        };
        assert_eq!(names(&f.apply(&t)), vec!["GGZ Noord"]);

        let f = MasterFilter { revenue_min: Some(0.0), ..Default::default() };
        assert_eq!(f.apply(&t).len(), 2);
    }

    #[test]
    fn predicates_compose_with_and() {
        let t = sample();
        let f = MasterFilter {
            care_types: vec![CareType::Vvt, CareType::Ggz],
            revenue_min: Some(10_000_000.0),
            reliable_fte_only: true,
            ..Default::default()
        };
        assert_eq!(names(&f.apply(&t)), vec!["Zorggroep Almere"]);

        let f = MasterFilter {
            provinces: vec!["Groningen".into()],
            reliable_fte_only: true,
            ..Default::default()
        };
        assert!(f.apply(&t).is_empty());
    }

    #[test]
    fn care_type_parse() {
        assert_eq!("vvt".parse::<CareType>(), Ok(CareType::Vvt));
        assert!("xyz".parse::<CareType>().is_err());
        assert_eq!(CareType::Msi.column(), "Is_MSI");
    }
}
