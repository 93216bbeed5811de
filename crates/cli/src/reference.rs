//! `digimv reference`: validate a postcode reference CSV.

use std::path::{Path, PathBuf};

use digimv_config::Settings;
use digimv_engine::ReferenceIndex;
use digimv_io::csv::load_reference;
use digimv_io::Upload;
use serde::Serialize;

use crate::{print_json, CliError};

/// Read and index a reference CSV with the configured match strategy.
pub(crate) fn load_reference_file(settings: &Settings, path: &Path) -> Result<ReferenceIndex, CliError> {
    let upload = Upload::from_path(path)?;
    let index = load_reference(&upload, settings.build.match_strategy)?;
    if index.is_empty() {
        tracing::warn!(file = %upload.name, "reference contains no usable postcodes");
    }
    Ok(index)
}

#[derive(Serialize)]
struct ReferenceReport {
    file: String,
    match_strategy: String,
    rows: usize,
    rows_skipped: usize,
    postcodes: usize,
    with_coordinates: usize,
}

pub fn cmd_reference(settings: &Settings, path: PathBuf, json: bool) -> Result<(), CliError> {
    let index = load_reference_file(settings, &path)?;
    let report = ReferenceReport {
        file: path.display().to_string(),
        match_strategy: index.strategy().to_string(),
        rows: index.rows_read(),
        rows_skipped: index.rows_skipped(),
        postcodes: index.len(),
        with_coordinates: index.with_coordinates(),
    };

    if json {
        print_json(&report)?;
    }
    eprintln!(
        "reference: {} rows, {} postcodes ({} match), {} with coordinates, {} skipped",
        report.rows, report.postcodes, report.match_strategy, report.with_coordinates, report.rows_skipped,
    );
    Ok(())
}
