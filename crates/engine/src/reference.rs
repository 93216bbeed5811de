use std::collections::HashMap;

use serde::Serialize;

use crate::error::MasterError;
use crate::postcode::MatchStrategy;
use crate::schema;
use crate::table::{Table, Value};

/// Geography for one postcode key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoEntry {
    pub province: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Postcode → geography lookup built from the reference CSV.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    strategy: MatchStrategy,
    entries: HashMap<String, GeoEntry>,
    rows_read: usize,
    rows_skipped: usize,
}

impl ReferenceIndex {
    /// Build the index. `table_name` only labels errors.
    ///
    /// The first row for a key wins. Rows without a usable postcode are
    /// skipped. Unparsable coordinates leave the entry without a position
    /// but keep its province.
    pub fn from_table(
        table_name: &str,
        table: &Table,
        strategy: MatchStrategy,
    ) -> Result<Self, MasterError> {
        let lookup = |name: &str| table.column_index_ci(name);

        let missing: Vec<&str> = schema::REFERENCE_REQUIRED
            .iter()
            .copied()
            .filter(|name| lookup(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(MasterError::missing_columns(table_name, missing));
        }

        // Presence checked above.
        let (Some(pc_col), Some(prov_col), Some(lat_col), Some(lon_col)) = (
            lookup(schema::REF_POSTCODE),
            lookup(schema::REF_PROVINCE),
            lookup(schema::REF_LAT),
            lookup(schema::REF_LON),
        ) else {
            return Err(MasterError::missing_columns(table_name, schema::REFERENCE_REQUIRED));
        };

        let mut entries = HashMap::new();
        let mut rows_skipped = 0;

        for row in 0..table.len() {
            let Some(key) = strategy.value_key(table.cell(row, pc_col)) else {
                rows_skipped += 1;
                continue;
            };
            if entries.contains_key(&key) {
                continue;
            }

            let province = Some(table.cell(row, prov_col).display().trim().to_string())
                .filter(|p| !p.is_empty());
            let lat = table.cell(row, lat_col).as_f64();
            let lon = table.cell(row, lon_col).as_f64();
            let (lat, lon) = match (lat, lon) {
                (Some(lat), Some(lon)) => (Some(lat), Some(lon)),
                _ => (None, None),
            };

            entries.insert(key, GeoEntry { province, lat, lon });
        }

        tracing::debug!(
            table = table_name,
            strategy = %strategy,
            entries = entries.len(),
            skipped = rows_skipped,
            "reference index built"
        );

        Ok(Self {
            strategy,
            entries,
            rows_read: table.len(),
            rows_skipped,
        })
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn rows_skipped(&self) -> usize {
        self.rows_skipped
    }

    /// Entries carrying both coordinates.
    pub fn with_coordinates(&self) -> usize {
        self.entries.values().filter(|e| e.lat.is_some()).count()
    }

    pub fn lookup(&self, postcode: &Value) -> Option<&GeoEntry> {
        let key = self.strategy.value_key(postcode)?;
        self.entries.get(&key)
    }
}

// ---------------------------------------------------------------------------
// Applying geography to a Master table
// ---------------------------------------------------------------------------

/// How `apply_geography` treats an existing `Provincie` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProvinceMode {
    /// Province always comes from the reference (BUILD_MASTER).
    Overwrite,
    /// Existing provinces are kept; only blanks are filled (LOAD_MASTER).
    FillBlank,
}

/// Outcome of a geography pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeoStats {
    pub matched: usize,
    /// Row indices with no reference match.
    pub unmatched: Vec<usize>,
}

/// Fill `Provincie`/`lat`/`lon` from the reference, keyed on `Postcode`.
/// Coordinates are always recomputed; unmatched rows get unset values.
pub(crate) fn apply_geography(
    table: &mut Table,
    index: &ReferenceIndex,
    mode: ProvinceMode,
) -> GeoStats {
    let pc_col = table.column_index(schema::POSTCODE);
    let prov_col = table.ensure_column(schema::PROVINCE);
    let lat_col = table.ensure_column(schema::LAT);
    let lon_col = table.ensure_column(schema::LON);

    let mut stats = GeoStats::default();

    for row in 0..table.len() {
        let entry = pc_col
            .and_then(|c| index.lookup(table.cell(row, c)))
            .cloned();

        let Some(entry) = entry else {
            stats.unmatched.push(row);
            if mode == ProvinceMode::Overwrite {
                table.set(row, prov_col, Value::Empty);
            }
            table.set(row, lat_col, Value::Empty);
            table.set(row, lon_col, Value::Empty);
            continue;
        };

        stats.matched += 1;
        let keep_existing = mode == ProvinceMode::FillBlank && !table.cell(row, prov_col).is_empty();
        if !keep_existing {
            table.set(row, prov_col, Value::from(entry.province));
        }
        table.set(row, lat_col, Value::from(entry.lat));
        table.set(row, lon_col, Value::from(entry.lon));
    }

    stats
}
