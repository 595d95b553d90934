//! Line-level CSV primitives.
//!
//! The files written by the ingestion side never quote fields, so a line is
//! split on every comma. Numbers may use either `.` or `,` as the decimal
//! separator depending on the client locale.

/// Field delimiter.
pub const DELIMITER: char = ',';

/// Split `line` into at most `max_fields` trimmed fields.
///
/// Trailing `\r`/`\n` is ignored. Fields past `max_fields` are dropped.
pub fn split_fields(line: &str, max_fields: usize) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n'])
        .split(DELIMITER)
        .take(max_fields)
        .map(str::trim)
        .collect()
}

/// Split `line` into exactly `fields` positions, padding missing trailing
/// fields with `""`.
pub fn split_exact(line: &str, fields: usize) -> Vec<&str> {
    let mut out = split_fields(line, fields);
    out.resize(fields, "");
    out
}

/// Parse a decimal number, accepting `,` as the decimal separator.
///
/// Empty input and non-finite results are rejected.
pub fn parse_decimal(field: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let value: f64 = if field.contains(',') {
        field.replace(',', ".").parse().ok()?
    } else {
        field.parse().ok()?
    };
    value.is_finite().then_some(value)
}

/// Parse an integer field, signed or not depending on `T`.
pub fn parse_integer<T: std::str::FromStr>(field: &str) -> Option<T> {
    field.trim().parse().ok()
}
