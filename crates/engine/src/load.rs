// LOAD_MASTER: a previously exported Master table, optionally re-joined
// against a reference for coordinates.

use crate::error::MasterError;
use crate::fte::{apply_fte_flag, FteThresholds};
use crate::reference::{apply_geography, GeoStats, ProvinceMode, ReferenceIndex};
use crate::schema;
use crate::table::Table;

#[derive(Debug, Clone)]
pub struct MasterLoad {
    pub table: Table,
    /// `None` when no reference was supplied (pass-through).
    pub geo: Option<GeoStats>,
}

/// Pass the uploaded table through, recompute `FTE_Betrouwbaar`, and when
/// a reference is given recompute `lat`/`lon` (filling blank provinces).
pub fn load_master(
    table_name: &str,
    mut table: Table,
    reference: Option<&ReferenceIndex>,
    fte: &FteThresholds,
) -> Result<MasterLoad, MasterError> {
    fte.validate()?;

    let geo = match reference {
        Some(index) => {
            if !table.has_column(schema::POSTCODE) {
                return Err(MasterError::missing_columns(table_name, [schema::POSTCODE]));
            }
            let stats = apply_geography(&mut table, index, ProvinceMode::FillBlank);
            tracing::debug!(
                table = table_name,
                matched = stats.matched,
                unmatched = stats.unmatched.len(),
                "master re-joined"
            );
            Some(stats)
        }
        None => None,
    };

    apply_fte_flag(&mut table, fte);
    tracing::info!(table = table_name, rows = table.len(), "master loaded");

    Ok(MasterLoad { table, geo })
}
