use digimv_engine::{Table, Value};
use unicode_width::UnicodeWidthStr;

/// Widest a single column may render in `show`.
const MAX_COLUMN_WIDTH: usize = 32;

/// Display width of a string, accounting for double-width characters.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width < 3 {
        return s
            .chars()
            .next()
            .filter(|ch| unicode_width::UnicodeWidthChar::width(*ch).unwrap_or(0) <= width)
            .map(String::from)
            .unwrap_or_default();
    }

    let budget = width - 2;
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str("..");
    out
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Right-align numbers so magnitudes line up.
fn pad_cell(value: &Value, text: &str, width: usize) -> String {
    match value {
        Value::Number(_) => {
            let text = truncate_display(text, width);
            format!("{}{}", " ".repeat(width - display_width(&text)), text)
        }
        _ => pad_right(text, width),
    }
}

/// Human cell text: revenue-like numbers get thousands separators,
/// booleans read as ja/nee.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Number(n) if n.fract() == 0.0 && n.abs() >= 10_000.0 => group_thousands(*n),
        Value::Number(n) if n.fract() != 0.0 => format!("{n:.1}"),
        Value::Bool(true) => "ja".to_string(),
        Value::Bool(false) => "nee".to_string(),
        other => other.display(),
    }
}

fn group_thousands(n: f64) -> String {
    let digits = format!("{}", n.abs() as u64);
    let mut out = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    if n < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// Plain-text table of the given columns (those present in `table`) for
/// the first `limit` rows.
pub(crate) fn render_table(table: &Table, columns: &[&str], limit: usize) -> String {
    let columns: Vec<&str> = columns.iter().copied().filter(|c| table.has_column(c)).collect();
    let shown = table.len().min(limit);

    let cells: Vec<Vec<(Value, String)>> = (0..shown)
        .map(|row| {
            columns
                .iter()
                .map(|col| {
                    let value = table.get(row, col).clone();
                    let text = cell_text(&value);
                    (value, text)
                })
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|row| display_width(&row[i].1))
                .chain(std::iter::once(display_width(name)))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns.iter().zip(&widths).map(|(name, &w)| pad_right(name, w)).collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|((value, text), &w)| pad_cell(value, text, w))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_cjk() {
        assert_eq!(display_width("\u{4e16}\u{754c}"), 4);
        assert_eq!(display_width("Fryslân"), 7);
    }

    #[test]
    fn truncate_cuts() {
        assert_eq!(truncate_display("abc", 3), "abc");
        assert_eq!(truncate_display("abcdef", 5), "abc..");
        assert_eq!(truncate_display("abc", 2), "a");
        assert_eq!(truncate_display("", 0), "");
    }

    #[test]
    fn pad_right_short_and_long() {
        assert_eq!(pad_right("ab", 5), "ab   ");
        assert_eq!(pad_right("abcdef", 5), "abc..");
    }

    #[test]
    fn thousands_use_dots() {
        assert_eq!(group_thousands(120_000_000.0), "120.000.000");
        assert_eq!(group_thousands(12_345.0), "12.345");
        assert_eq!(group_thousands(-1_000_000.0), "-1.000.000");
    }

    #[test]
    fn renders_present_columns_only() {
        let table = Table::from_rows(
            ["Naam", "Omzet_Totaal", "Is_VVT"],
            vec![
                vec![Value::from("Zorggroep Almere"), Value::Number(120_000_000.0), Value::Bool(true)],
                vec![Value::from("GGZ Noord"), Value::Empty, Value::Bool(false)],
            ],
        );
        let text = render_table(&table, &["Naam", "Plaats", "Omzet_Totaal", "Is_VVT"], 10);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Naam"));
        assert!(!lines[0].contains("Plaats"));
        assert!(lines[2].contains("120.000.000"));
        assert!(lines[2].ends_with("ja"));
        assert!(lines[3].ends_with("nee"));
    }

    #[test]
    fn limit_caps_rows() {
        let table = Table::from_rows(["Naam"], (0..5).map(|i| vec![Value::from(format!("org {i}"))]).collect());
        assert_eq!(render_table(&table, &["Naam"], 2).lines().count(), 4);
    }
}
