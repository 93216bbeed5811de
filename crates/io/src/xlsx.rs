// Excel import (DigiMV parts, exported Masters) and export (Master workbook)
//
// Import: each sheet becomes a Table. The first row of the used range is the
// header; fully empty rows are dropped.
// Export: one sheet per table, bold frozen header with an autofilter.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::NaiveDateTime;
use digimv_engine::{MasterLayout, SourceWorkbook, Table, Value};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook, Worksheet};

use crate::error::IoError;
use crate::upload::Upload;
use crate::MASTER_SHEET_NAME;

/// Largest column index Excel accepts (XFD).
const MAX_COLUMNS: usize = 16_384;

type UploadSheets = Sheets<Cursor<Vec<u8>>>;

fn open(upload: &Upload) -> Result<UploadSheets, IoError> {
    open_workbook_auto_from_rs(Cursor::new(upload.bytes.clone()))
        .map_err(|e| IoError::malformed(&upload.name, e))
}

/// Parse one DigiMV part. Only the sheets the layout refers to are read;
/// sheets the workbook lacks are simply absent and left to the engine to
/// judge (a missing base sheet is an error there, a missing secondary a
/// warning).
pub fn read_source_workbook(upload: &Upload, part: u32, layout: &MasterLayout) -> Result<SourceWorkbook, IoError> {
    let mut workbook = open(upload)?;
    let available: Vec<String> = workbook.sheet_names().to_vec();
    let mut source = SourceWorkbook::new(part, upload.name.clone());

    for sheet in layout.sheet_names() {
        if !available.iter().any(|name| name == sheet) {
            tracing::debug!(file = %upload.name, sheet, "sheet not in workbook");
            continue;
        }
        let range = workbook
            .worksheet_range(sheet)
            .map_err(|e| IoError::malformed(&upload.name, format!("sheet '{sheet}': {e}")))?;
        let table = range_to_table(&range);
        tracing::debug!(file = %upload.name, sheet, rows = table.len(), "sheet read");
        source = source.with_sheet(sheet, table);
    }

    Ok(source)
}

/// Parse an exported Master: the first sheet, whatever its name.
pub fn read_master(upload: &Upload) -> Result<Table, IoError> {
    let mut workbook = open(upload)?;
    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IoError::malformed(&upload.name, "workbook contains no sheets"))?;
    let range = workbook
        .worksheet_range(&first)
        .map_err(|e| IoError::malformed(&upload.name, format!("sheet '{first}': {e}")))?;
    let table = range_to_table(&range);
    tracing::info!(file = %upload.name, sheet = %first, rows = table.len(), "master read");
    Ok(table)
}

fn range_to_table(range: &Range<Data>) -> Table {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Table::new(Vec::<String>::new());
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match data_to_value(cell) {
            Value::Empty => format!("Column{}", i + 1),
            value => value.display().trim().to_string(),
        })
        .collect();

    let mut table = Table::new(columns);
    for row in rows {
        let values: Vec<Value> = row.iter().map(data_to_value).collect();
        if values.iter().all(Value::is_empty) {
            continue;
        }
        table.push_row(values);
    }
    table
}

fn data_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) => Value::text(s.as_str()),
        Data::Float(n) => Value::Number(*n),
        Data::Int(n) => Value::Number(*n as f64),
        Data::Bool(b) => Value::Bool(*b),
        // Cached formula errors (#N/A, #DIV/0!) carry no usable value
        Data::Error(_) => Value::Empty,
        // Serial number; DigiMV has no date columns in the layout
        Data::DateTime(dt) => Value::Number(dt.as_f64()),
        Data::DateTimeIso(s) => Value::text(s.as_str()),
        Data::DurationIso(s) => Value::text(s.as_str()),
    }
}

/// Write tables as sheets of one xlsx workbook, returned as bytes.
pub fn write_workbook(sheets: &[(&str, &Table)]) -> Result<Vec<u8>, IoError> {
    let mut workbook = XlsxWorkbook::new();
    let header_format = Format::new().set_bold();

    for (name, table) in sheets {
        let worksheet = workbook
            .add_worksheet()
            .set_name(*name)
            .map_err(|e| IoError::Write(format!("sheet '{name}': {e}")))?;
        write_sheet(worksheet, table, &header_format)
            .map_err(|e| IoError::Write(format!("sheet '{name}': {e}")))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| IoError::Write(e.to_string()))
}

fn write_sheet(worksheet: &mut Worksheet, table: &Table, header_format: &Format) -> Result<(), String> {
    if table.width() > MAX_COLUMNS {
        return Err(format!("{} columns exceed the Excel limit of {MAX_COLUMNS}", table.width()));
    }
    let last_row = u32::try_from(table.len()).map_err(|_| "too many rows".to_string())?;

    for (col, name) in table.columns().iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, name, header_format)
            .map_err(|e| e.to_string())?;
    }

    for (r, row) in table.rows().iter().enumerate() {
        let row32 = r as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            let col16 = col as u16;
            match value {
                Value::Empty => {}
                Value::Text(s) => {
                    worksheet.write_string(row32, col16, s).map_err(|e| e.to_string())?;
                }
                Value::Number(n) => {
                    worksheet.write_number(row32, col16, *n).map_err(|e| e.to_string())?;
                }
                Value::Bool(b) => {
                    worksheet.write_boolean(row32, col16, *b).map_err(|e| e.to_string())?;
                }
            }
        }
    }

    if table.width() > 0 {
        worksheet.set_freeze_panes(1, 0).map_err(|e| e.to_string())?;
        worksheet
            .autofilter(0, 0, last_row, (table.width() - 1) as u16)
            .map_err(|e| e.to_string())?;
        worksheet.autofit();
    }
    Ok(())
}

/// Master workbook bytes: a single sheet named `Master`.
pub fn write_master(table: &Table) -> Result<Vec<u8>, IoError> {
    let bytes = write_workbook(&[(MASTER_SHEET_NAME, table)])?;
    tracing::info!(rows = table.len(), bytes = bytes.len(), "master written");
    Ok(bytes)
}

/// `<prefix>_<YYYYmmdd_HHMM>.xlsx`
pub fn export_file_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{}_{}.xlsx", prefix, now.format("%Y%m%d_%H%M"))
}
