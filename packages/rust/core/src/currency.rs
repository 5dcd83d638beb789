//! Indonesian-convention currency parsing.
//!
//! Upstream amounts look like `Rp. 1.234.567,89`: `.` groups thousands and
//! `,` marks decimals. Parsing is total; anything unusable becomes `0.0`.

use tenderstat_shared::RawField;

/// Literal prefix stripped before parsing.
const RUPIAH_PREFIX: &str = "Rp. ";

/// Parse a currency string into an amount.
///
/// `None` (a non-string upstream value) and malformed text both map to
/// `0.0`. The result is always finite and non-negative.
pub fn parse(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let trimmed = raw.trim();
    let body = trimmed.strip_prefix(RUPIAH_PREFIX).unwrap_or(trimmed);
    let normalized = body.replace('.', "").replace(',', ".");

    match normalized.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => amount,
        _ => 0.0,
    }
}

/// Parse a loosely-typed field; only JSON strings can carry an amount.
pub fn parse_field(field: &RawField) -> f64 {
    parse(field.as_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rupiah_with_thousands_and_decimals() {
        assert_eq!(parse(Some("Rp. 1.234.567,89")), 1234567.89);
        assert_eq!(parse(Some("Rp. 100.000,00")), 100000.0);
    }

    #[test]
    fn parses_without_prefix() {
        assert_eq!(parse(Some("2.500")), 2500.0);
        assert_eq!(parse(Some("750,5")), 750.5);
        assert_eq!(parse(Some("  Rp. 1.000  ")), 1000.0);
    }

    #[test]
    fn malformed_input_is_zero() {
        assert_eq!(parse(Some("garbage")), 0.0);
        assert_eq!(parse(Some("")), 0.0);
        assert_eq!(parse(Some("Rp. ")), 0.0);
        assert_eq!(parse(Some("Rp.1.000")), 0.0);
        assert_eq!(parse(None), 0.0);
    }

    #[test]
    fn never_negative_or_non_finite() {
        assert_eq!(parse(Some("-5.000")), 0.0);
        assert_eq!(parse(Some("inf")), 0.0);
        assert_eq!(parse(Some("NaN")), 0.0);
        assert_eq!(parse(Some("-0")), 0.0);
        assert!(parse(Some("-0")).is_sign_positive());
    }

    #[test]
    fn non_text_fields_are_zero() {
        assert_eq!(parse_field(&RawField::NonText(json!(150000))), 0.0);
        assert_eq!(parse_field(&RawField::Missing), 0.0);
        assert_eq!(parse_field(&RawField::from("Rp. 3.000,25")), 3000.25);
    }
}
