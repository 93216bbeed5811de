//! `digimv build`: DigiMV parts + reference → Master workbook.

use std::path::PathBuf;

use digimv_config::Settings;
use digimv_engine::{build_master, summarize, BuildStats, BuildWarning, MasterSummary, SourceWorkbook};
use digimv_io::xlsx::read_source_workbook;
use digimv_io::{IoError, Upload};
use serde::Serialize;

use crate::filters::FilterArgs;
use crate::master::write_output;
use crate::reference::load_reference_file;
use crate::{print_json, CliError};

/// A part that could not be parsed and was left out of the build.
#[derive(Debug, Serialize)]
struct SkippedPart {
    part: u32,
    file: String,
    reason: String,
}

#[derive(Serialize)]
struct BuildReport {
    output: String,
    stats: BuildStats,
    /// Rows written after filtering.
    rows_written: usize,
    summary: MasterSummary,
    skipped_parts: Vec<SkippedPart>,
    warnings: Vec<BuildWarning>,
}

pub fn cmd_build(
    settings: &Settings,
    parts: Vec<PathBuf>,
    reference: Option<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
    filters: &FilterArgs,
) -> Result<(), CliError> {
    let filter = filters.to_filter()?;
    let config = settings.master_config();

    let index = reference.as_deref().map(|path| load_reference_file(settings, path)).transpose()?;
    if index.is_none() {
        tracing::info!("no reference given; Provincie, lat and lon stay empty");
    }

    let mut sources: Vec<SourceWorkbook> = Vec::new();
    let mut skipped = Vec::new();
    for (i, path) in parts.iter().enumerate() {
        let part = i as u32 + 1;
        let upload = Upload::from_path(path)?;
        match read_source_workbook(&upload, part, &config.layout) {
            Ok(source) => sources.push(source),
            Err(IoError::MalformedFile { file, reason }) => {
                tracing::warn!(part, file = %file, reason = %reason, "part skipped");
                eprintln!("warning: part {part} ({file}) skipped: {reason}");
                skipped.push(SkippedPart { part, file, reason });
            }
            Err(other) => return Err(other.into()),
        }
    }

    if sources.is_empty() {
        return Err(CliError::malformed("no part workbook could be read")
            .with_hint("parts must be DigiMV exports in xls or xlsx format"));
    }

    let build = build_master(&sources, index.as_ref(), &config)?;
    let table = filter.apply(&build.table);
    let path = write_output(settings, &table, output)?;

    for warning in &build.warnings {
        tracing::warn!("{warning}");
    }

    let stats = &build.stats;
    eprintln!("built {} rows from {} part(s)", stats.rows_out, stats.parts);
    if index.is_some() {
        eprintln!("{} geocoded, {} without reference match", stats.geo_matched, stats.geo_unmatched);
    }
    if stats.dropped_without_care_type > 0 {
        eprintln!("{} rows dropped without care type", stats.dropped_without_care_type);
    }
    eprintln!("wrote {} rows to {}", table.len(), path.display());

    if json {
        let report = BuildReport {
            output: path.display().to_string(),
            rows_written: table.len(),
            summary: summarize(&table),
            stats: build.stats,
            skipped_parts: skipped,
            warnings: build.warnings,
        };
        print_json(&report)?;
    }
    Ok(())
}
