use std::sync::LazyLock;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use regex::Regex;

use crate::error::Result;

static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid regex"));

/// Render one CSV line with every field double-quoted. Embedded double
/// quotes are replaced by spaces rather than escaped.
pub fn csv_line<I, S>(fields: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    wtr.write_record(fields.into_iter().map(|f| f.as_ref().replace('"', " ")))?;
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    let mut line = String::from_utf8_lossy(&bytes).into_owned();
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// Round to 2 decimal places, halves away from zero. Never returns `-0.0`.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}

/// Shortest plain rendering of a rounded total: 250.0 -> "250", 32.08 -> "32.08".
pub fn number(value: f64) -> String {
    format!("{}", round2(value))
}

/// Parse a plain decimal amount for summing. Thousands separators are
/// ignored; exponents, `nan` and `inf` are not numbers here.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "");
    let s = s.trim();
    if !PLAIN_DECIMAL.is_match(s) {
        return None;
    }
    s.parse().ok()
}

/// Format a float as an amount with thousands separators: 1,234.56
pub fn money(val: f64) -> String {
    let fixed = format!("{:.2}", round2(val).abs());
    let (units, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let groups: Vec<&str> = units
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect();
    let sign = if val < 0.0 && round2(val) != 0.0 { "-" } else { "" };
    format!("{sign}{}.{cents}", groups.join(","))
}
