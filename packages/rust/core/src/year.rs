//! Budget-year extraction from free-form strings like `"APBD 2022"`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tenderstat_shared::RawField;

/// Runs of ASCII digits. `\d` would also match non-ASCII digits.
static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));

/// Extract the first standalone 4-digit run as a year.
///
/// Digit runs of any other length (`"20223"`, `"22"`) are skipped. Returns
/// `None` when no such run exists; callers exclude those rows rather than
/// substituting a placeholder year.
pub fn extract(raw: Option<&str>) -> Option<i32> {
    let raw = raw?;
    DIGIT_RUN_RE
        .find_iter(raw)
        .map(|m| m.as_str())
        .find(|run| run.len() == 4)
        .and_then(|run| run.parse().ok())
}

/// Extract a year from a loosely-typed field.
///
/// Integer JSON numbers are read through their decimal rendering; other
/// non-string values have no year.
pub fn extract_field(field: &RawField) -> Option<i32> {
    match field {
        RawField::Text(s) => extract(Some(s)),
        RawField::NonText(Value::Number(n)) if n.is_i64() || n.is_u64() => {
            extract(Some(&n.to_string()))
        }
        _ => None,
    }
}
