/// Keep digits and the decimal point only: `"$1,299.00"` becomes `"1299.00"`.
pub fn normalize_price(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// A usable price contains at least one digit after normalisation.
pub fn parse_price(raw: &str) -> Option<String> {
    let normalized = normalize_price(raw);
    normalized
        .chars()
        .any(|c| c.is_ascii_digit())
        .then_some(normalized)
}
