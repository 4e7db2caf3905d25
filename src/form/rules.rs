//! Small building blocks for form validators.

/// Outcome of reading a numeric text field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Missing,
    Invalid,
    Value(f64),
}

/// Read a decimal typed by a person: surrounding blanks are ignored and a
/// comma is accepted as the decimal separator.
pub fn number(raw: &str) -> Number {
    let raw = raw.trim();
    if raw.is_empty() {
        return Number::Missing;
    }
    match parse_decimal(raw) {
        Some(value) => Number::Value(value),
        None => Number::Invalid,
    }
}

pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Length in characters, not bytes.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Whether `value` is blank after trimming.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// `None` for blank text, the trimmed text otherwise.
pub fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
