//! Master column names the engine reads or writes directly.
//!
//! Layout-driven columns (everything from the DigiMV sheets) are configured
//! in [`crate::config::MasterLayout`]; the names here are the ones filters,
//! summaries and the map projection depend on.

pub const PART: &str = "Bron_Part";
pub const CODE: &str = "Code";
pub const NAME: &str = "Naam";
pub const KVK: &str = "KVK";
pub const POSTCODE: &str = "Postcode";
pub const PLACE: &str = "Plaats";

pub const IS_VVT: &str = "Is_VVT";
pub const IS_GGZ: &str = "Is_GGZ";
pub const IS_GHZ: &str = "Is_GHZ";
pub const IS_MSI: &str = "Is_MSI";

pub const REVENUE_TOTAL: &str = "Omzet_Totaal";
pub const FTE_TOTAL: &str = "FTE_Totaal";

pub const PROVINCE: &str = "Provincie";
pub const FTE_RELIABLE: &str = "FTE_Betrouwbaar";
pub const LAT: &str = "lat";
pub const LON: &str = "lon";

/// Care-type flags, in marker-colour precedence order.
pub const CARE_TYPE_COLUMNS: [&str; 4] = [IS_VVT, IS_GGZ, IS_GHZ, IS_MSI];

/// Columns shown by table views, in display order.
pub const DISPLAY_COLUMNS: [&str; 8] = [
    NAME,
    PLACE,
    PROVINCE,
    REVENUE_TOTAL,
    FTE_TOTAL,
    IS_VVT,
    IS_GGZ,
    IS_GHZ,
];

// Reference CSV headers (matched case-insensitively).
pub const REF_POSTCODE: &str = "postcode";
pub const REF_PROVINCE: &str = "provincie";
pub const REF_LAT: &str = "lat";
pub const REF_LON: &str = "lon";

pub const REFERENCE_REQUIRED: [&str; 4] = [REF_POSTCODE, REF_PROVINCE, REF_LAT, REF_LON];
