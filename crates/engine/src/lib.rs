//! `digimv-engine`: Master Database join engine.
//!
//! Pure engine crate: receives pre-loaded tables (DigiMV parts and the
//! postcode reference), returns the joined Master table. No CLI or IO
//! dependencies.

pub mod build;
pub mod config;
pub mod error;
pub mod filter;
pub mod fte;
pub mod load;
pub mod map;
pub mod postcode;
pub mod reference;
pub mod schema;
pub mod summary;
pub mod table;

pub use build::{build_master, BuildStats, BuildWarning, MasterBuild, SourceWorkbook};
pub use config::{BuildOptions, ColumnSpec, MasterConfig, MasterLayout, Transform};
pub use error::MasterError;
pub use filter::{CareType, MasterFilter};
pub use fte::FteThresholds;
pub use load::{load_master, MasterLoad};
pub use map::{map_view, MapPoint, MapView, MarkerColor};
pub use postcode::MatchStrategy;
pub use reference::{GeoEntry, ReferenceIndex};
pub use summary::{summarize, MasterSummary};
pub use table::{Table, Value};
