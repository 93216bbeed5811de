// BUILD_MASTER: DigiMV parts + reference → Master table.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::{ColumnSpec, MasterConfig, MasterLayout, Transform};
use crate::error::MasterError;
use crate::fte::apply_fte_flag;
use crate::reference::{apply_geography, ProvinceMode, ReferenceIndex};
use crate::schema;
use crate::table::{Table, Value};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One uploaded DigiMV workbook, already parsed into sheets.
#[derive(Debug, Clone)]
pub struct SourceWorkbook {
    /// 1-based upload position, written to `Bron_Part`.
    pub part: u32,
    /// Label used in errors and warnings (usually the file name).
    pub name: String,
    pub sheets: HashMap<String, Table>,
}

impl SourceWorkbook {
    pub fn new(part: u32, name: impl Into<String>) -> Self {
        Self {
            part,
            name: name.into(),
            sheets: HashMap::new(),
        }
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>, table: Table) -> Self {
        self.sheets.insert(sheet.into(), table);
        self
    }

    /// Organization rows this part contributes.
    pub fn row_count(&self, layout: &MasterLayout) -> usize {
        self.sheets.get(&layout.base_sheet).map(Table::len).unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Non-fatal findings surfaced alongside the Master table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuildWarning {
    /// Organization whose postcode matched no reference row.
    UnmatchedPostcode {
        part: u32,
        code: String,
        postcode: String,
    },
    /// Secondary sheet skipped (no key column); its Master columns stay unset.
    IgnoredSheet {
        part: u32,
        sheet: String,
        reason: String,
    },
    /// Secondary sheet absent from the workbook; its Master columns stay unset.
    AbsentSheet { part: u32, sheet: String },
}

impl std::fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnmatchedPostcode { part, code, postcode } => {
                write!(f, "part {part}, code '{code}': postcode '{postcode}' not in reference")
            }
            Self::IgnoredSheet { part, sheet, reason } => {
                write!(f, "part {part}: sheet '{sheet}' ignored ({reason})")
            }
            Self::AbsentSheet { part, sheet } => {
                write!(f, "part {part}: sheet '{sheet}' not present")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub parts: usize,
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped_without_care_type: usize,
    pub geo_matched: usize,
    pub geo_unmatched: usize,
}

#[derive(Debug, Clone)]
pub struct MasterBuild {
    pub table: Table,
    pub stats: BuildStats,
    pub warnings: Vec<BuildWarning>,
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

/// Build the Master table: project every part through the layout,
/// concatenate, join geography, derive the FTE flag, sort by revenue.
pub fn build_master(
    sources: &[SourceWorkbook],
    reference: Option<&ReferenceIndex>,
    config: &MasterConfig,
) -> Result<MasterBuild, MasterError> {
    config.validate()?;
    if sources.is_empty() {
        return Err(MasterError::NoSources);
    }

    let layout = &config.layout;
    let mut table = Table::new(layout.output_columns());
    let mut warnings = Vec::new();
    let mut stats = BuildStats {
        parts: sources.len(),
        ..Default::default()
    };

    for source in sources {
        let rows = project_part(source, layout, &mut warnings)?;
        tracing::debug!(part = source.part, name = %source.name, rows = rows.len(), "part projected");
        stats.rows_in += rows.len();
        for row in rows {
            table.push_row(row);
        }
    }

    if config.build.require_care_type {
        let before = table.len();
        table = table.filter_rows(has_care_type);
        stats.dropped_without_care_type = before - table.len();
    }

    if let Some(index) = reference {
        let geo = apply_geography(&mut table, index, ProvinceMode::Overwrite);
        stats.geo_matched = geo.matched;
        stats.geo_unmatched = geo.unmatched.len();
        for row in geo.unmatched {
            warnings.push(BuildWarning::UnmatchedPostcode {
                part: part_of(&table, row),
                code: table.get(row, schema::CODE).display(),
                postcode: table.get(row, schema::POSTCODE).display(),
            });
        }
    } else {
        stats.geo_unmatched = table.len();
    }

    apply_fte_flag(&mut table, &config.fte);
    sort_by_revenue(&mut table);

    stats.rows_out = table.len();
    tracing::info!(
        parts = stats.parts,
        rows = stats.rows_out,
        geo_matched = stats.geo_matched,
        geo_unmatched = stats.geo_unmatched,
        "master built"
    );

    Ok(MasterBuild {
        table,
        stats,
        warnings,
    })
}

/// Secondary sheet rows indexed by key; first row per key wins.
struct KeyedSheet<'a> {
    table: &'a Table,
    rows: HashMap<String, usize>,
}

impl<'a> KeyedSheet<'a> {
    fn new(table: &'a Table, key_col: usize) -> Self {
        let mut rows = HashMap::new();
        for row in 0..table.len() {
            if let Some(key) = key_text(table.cell(row, key_col)) {
                rows.entry(key).or_insert(row);
            }
        }
        Self { table, rows }
    }

    fn value(&self, key: Option<&str>, column: &str) -> Value {
        key.and_then(|k| self.rows.get(k))
            .map(|&row| self.table.get(row, column).clone())
            .unwrap_or(Value::Empty)
    }
}

fn project_part(
    source: &SourceWorkbook,
    layout: &MasterLayout,
    warnings: &mut Vec<BuildWarning>,
) -> Result<Vec<Vec<Value>>, MasterError> {
    let base = source
        .sheets
        .get(&layout.base_sheet)
        .ok_or_else(|| MasterError::MissingSheet {
            part: source.name.clone(),
            sheet: layout.base_sheet.clone(),
        })?;

    let required: Vec<&str> = layout.required_columns.iter().map(String::as_str).collect();
    let missing = base.missing_columns(&required);
    if !missing.is_empty() {
        return Err(MasterError::missing_columns(
            format!("{}/{}", source.name, layout.base_sheet),
            missing,
        ));
    }

    let mut secondary: HashMap<&str, KeyedSheet> = HashMap::new();
    for sheet in layout.sheet_names().into_iter().skip(1) {
        let Some(table) = source.sheets.get(sheet) else {
            tracing::warn!(part = source.part, sheet, "sheet not present");
            warnings.push(BuildWarning::AbsentSheet {
                part: source.part,
                sheet: sheet.to_string(),
            });
            continue;
        };
        let Some(key_col) = table.column_index(&layout.key_column) else {
            tracing::warn!(part = source.part, sheet, "sheet has no key column, ignored");
            warnings.push(BuildWarning::IgnoredSheet {
                part: source.part,
                sheet: sheet.to_string(),
                reason: format!("no '{}' column", layout.key_column),
            });
            continue;
        };
        secondary.insert(sheet, KeyedSheet::new(table, key_col));
    }

    let base_key_col = base.column_index(&layout.key_column);
    let mut rows = Vec::with_capacity(base.len());

    for row in 0..base.len() {
        let key = base_key_col.and_then(|c| key_text(base.cell(row, c)));
        let mut out = Vec::with_capacity(layout.columns.len() + 1);
        out.push(Value::Number(f64::from(source.part)));

        for spec in &layout.columns {
            let raw = if spec.sheet == layout.base_sheet {
                base.get(row, &spec.column).clone()
            } else {
                secondary
                    .get(spec.sheet.as_str())
                    .map(|s| s.value(key.as_deref(), &spec.column))
                    .unwrap_or(Value::Empty)
            };
            out.push(transform(spec, raw));
        }

        rows.push(out);
    }

    Ok(rows)
}

fn transform(spec: &ColumnSpec, raw: Value) -> Value {
    match spec.transform {
        Transform::None => raw,
        Transform::JaNee => Value::from(ja_nee(&raw)),
        Transform::Number => Value::from(raw.as_f64()),
    }
}

/// "ja"/"nee" (any case, trimmed) to a boolean; booleans pass through.
pub fn ja_nee(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Text(s) => match s.trim().to_lowercase().as_str() {
            "ja" => Some(true),
            "nee" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Sheet join key: trimmed display text.
fn key_text(value: &Value) -> Option<String> {
    let text = value.display();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn has_care_type(table: &Table, row: usize) -> bool {
    schema::CARE_TYPE_COLUMNS
        .iter()
        .any(|col| table.get(row, col).as_bool() == Some(true))
}

fn part_of(table: &Table, row: usize) -> u32 {
    table
        .get(row, schema::PART)
        .as_f64()
        .map(|n| n as u32)
        .unwrap_or(0)
}

/// Stable sort, highest revenue first, unknown revenue last.
fn sort_by_revenue(table: &mut Table) {
    let Some(col) = table.column_index(schema::REVENUE_TOTAL) else {
        return;
    };
    table.rows_mut().sort_by(|a, b| {
        match (a[col].as_f64(), b[col].as_f64()) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
