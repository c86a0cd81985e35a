pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value
        .replace(['\u{feff}', '\u{200b}'], "")
        .replace(['_', '-'], " ");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_ascii_lowercase()
}

/// Key used to match an address against geocoder output.
pub(crate) fn normalize_address(value: &str) -> String {
    value
        .replace([',', '.', '#'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase()
}

/// A spreadsheet cell read as a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumericCell {
    Blank,
    Value(f64),
    Invalid,
}

/// Accepts `$1,250,000`, ` 4.5 ` and similar; anything non-finite is invalid.
pub(crate) fn parse_number(value: Option<&str>) -> NumericCell {
    let Some(raw) = value else {
        return NumericCell::Blank;
    };
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return NumericCell::Blank;
    }
    match cleaned.parse::<f64>() {
        Ok(number) if number.is_finite() => NumericCell::Value(number),
        _ => NumericCell::Invalid,
    }
}
