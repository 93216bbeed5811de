//! `digimv export | show | points`: commands over a previously exported
//! Master workbook.

use std::path::{Path, PathBuf};

use digimv_config::Settings;
use digimv_engine::schema::DISPLAY_COLUMNS;
use digimv_engine::{load_master, map_view, summarize, MasterSummary, Table, Value};
use digimv_io::xlsx::{read_master, write_master};
use digimv_io::Upload;
use serde::Serialize;

use crate::filters::FilterArgs;
use crate::reference::load_reference_file;
use crate::util::render_table;
use crate::{print_json, CliError};

/// LOAD_MASTER from disk, then apply the row filters.
fn load_filtered(
    settings: &Settings,
    master: &Path,
    reference: Option<&Path>,
    filters: &FilterArgs,
) -> Result<Table, CliError> {
    let filter = filters.to_filter()?;
    let index = reference.map(|path| load_reference_file(settings, path)).transpose()?;
    let upload = Upload::from_path(master)?;
    let table = read_master(&upload)?;

    let loaded = load_master(&upload.name, table, index.as_ref(), &settings.fte)?;
    if let Some(geo) = &loaded.geo {
        if !geo.unmatched.is_empty() {
            tracing::warn!(unmatched = geo.unmatched.len(), "rows without a reference postcode match");
        }
    }

    Ok(filter.apply(&loaded.table))
}

/// Write the Master to `output` (or a timestamped default name); returns the path.
pub(crate) fn write_output(settings: &Settings, table: &Table, output: Option<PathBuf>) -> Result<PathBuf, CliError> {
    let path = output.unwrap_or_else(|| {
        let now = chrono::Local::now().naive_local();
        PathBuf::from(digimv_io::xlsx::export_file_name(&settings.export.file_prefix, now))
    });
    let bytes = write_master(table)?;
    std::fs::write(&path, bytes)
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    Ok(path)
}

pub fn cmd_export(
    settings: &Settings,
    master: PathBuf,
    reference: Option<PathBuf>,
    output: Option<PathBuf>,
    filters: &FilterArgs,
) -> Result<(), CliError> {
    let table = load_filtered(settings, &master, reference.as_deref(), filters)?;
    let path = write_output(settings, &table, output)?;
    eprintln!("exported {} rows to {}", table.len(), path.display());
    Ok(())
}

#[derive(Serialize)]
struct ShowReport {
    summary: MasterSummary,
    rows: Vec<serde_json::Map<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    truncated_at: Option<usize>,
}

pub fn cmd_show(
    settings: &Settings,
    master: PathBuf,
    reference: Option<PathBuf>,
    limit: usize,
    json: bool,
    filters: &FilterArgs,
) -> Result<(), CliError> {
    let table = load_filtered(settings, &master, reference.as_deref(), filters)?;
    let summary = summarize(&table);

    if json {
        let report = ShowReport {
            rows: row_objects(&table, limit),
            truncated_at: (table.len() > limit).then_some(limit),
            summary,
        };
        return print_json(&report);
    }

    println!(
        "{} organizations, {} VVT, revenue EUR {:.1}M, {:.0} FTE",
        summary.organizations,
        summary.vvt,
        summary.total_revenue / 1_000_000.0,
        summary.total_fte,
    );
    println!(
        "{} with coordinates, {} without; provinces: {}",
        summary.with_coordinates,
        summary.without_coordinates,
        if summary.provinces.is_empty() { "-".to_string() } else { summary.provinces.join(", ") },
    );
    println!();
    print!("{}", render_table(&table, &DISPLAY_COLUMNS, limit));
    if table.len() > limit {
        println!("... {} more rows", table.len() - limit);
    }
    Ok(())
}

pub fn cmd_points(
    settings: &Settings,
    master: PathBuf,
    reference: Option<PathBuf>,
    selected: Option<String>,
    limit: Option<usize>,
    filters: &FilterArgs,
) -> Result<(), CliError> {
    let table = load_filtered(settings, &master, reference.as_deref(), filters)?;
    let max_rows = limit.unwrap_or(settings.map.max_markers);
    let view = map_view(&table, selected.as_deref(), max_rows);

    if let Some(code) = &selected {
        if !view.points.iter().any(|p| p.selected) {
            tracing::warn!(code = %code, "selected code has no marker");
        }
    }
    eprintln!("{} markers from {} rows", view.points.len(), table.len());
    print_json(&view)
}

/// Leading rows as JSON objects keyed by column name, empty cells as null.
fn row_objects(table: &Table, limit: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
    table
        .rows()
        .iter()
        .take(limit)
        .map(|row| {
            table
                .columns()
                .iter()
                .zip(row)
                .map(|(name, value)| (name.clone(), json_value(value)))
                .collect()
        })
        .collect()
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Empty => serde_json::Value::Null,
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Bool(b) => serde_json::Value::Bool(*b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_become_objects() {
        let table = Table::from_rows(
            ["Naam", "Omzet_Totaal", "lat"],
            vec![
                vec![Value::from("Zorg A"), Value::Number(2_000_000.0), Value::Empty],
                vec![Value::from("Zorg B"), Value::Empty, Value::Number(52.1)],
            ],
        );
        let rows = row_objects(&table, 1);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Naam"], "Zorg A");
        assert_eq!(rows[0]["Omzet_Totaal"], 2_000_000.0);
        assert!(rows[0]["lat"].is_null());
    }
}
