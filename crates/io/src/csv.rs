// Reference CSV import (postcode → province / coordinates)

use digimv_engine::{MatchStrategy, ReferenceIndex, Table, Value};

use crate::error::IoError;
use crate::upload::Upload;

/// Parse the reference upload into a text table. Header names are kept
/// verbatim (minus a UTF-8 BOM); the engine matches them case-insensitively.
pub fn read_reference_table(upload: &Upload) -> Result<Table, IoError> {
    let content = decode_utf8(&upload.bytes);
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
    let delimiter = sniff_delimiter(content);
    import_from_string(&upload.name, content, delimiter)
}

/// Parse and index the reference in one step.
pub fn load_reference(upload: &Upload, strategy: MatchStrategy) -> Result<ReferenceIndex, IoError> {
    let table = read_reference_table(upload)?;
    let index = ReferenceIndex::from_table(&upload.name, &table, strategy)?;
    tracing::info!(
        file = %upload.name,
        rows = index.rows_read(),
        postcodes = index.len(),
        "reference loaded"
    );
    Ok(index)
}

/// Detect the field delimiter by checking consistency across the first few lines.
///
/// For each candidate (semicolon, tab, comma, pipe), count fields per line. The
/// delimiter that produces the most consistent field count (>1 field) wins;
/// semicolon is the fallback.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b';', b'\t', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b';';
    }

    let mut best = b';';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        // Must produce >1 field on the header line to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (lines with the header's field count) * field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Decode bytes as UTF-8, falling back to Windows-1252 (Excel-exported CSVs).
pub fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

fn import_from_string(name: &str, content: &str, delimiter: u8) -> Result<Table, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| IoError::malformed(name, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(IoError::malformed(name, "no header row"));
    }

    let mut table = Table::new(headers);
    for result in reader.records() {
        let record = result.map_err(|e| IoError::malformed(name, e))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        table.push_row(record.iter().map(|f| Value::text(f.trim())).collect());
    }

    Ok(table)
}
