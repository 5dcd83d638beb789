//! Saved scrape responses on disk.

use std::path::Path;

use serde_json::Value;
use tenderstat_shared::{Result, TenderStatError};

/// File name a response for `company` is saved under by default.
///
/// Runs of whitespace collapse to a single space.
pub fn default_save_name(company: &str) -> String {
    let name = company.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{name}.json")
}

/// Read a previously saved response body.
pub fn load_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| TenderStatError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| TenderStatError::parse(format!("{}: {e}", path.display())))
}

/// Write a response body as pretty-printed JSON.
pub fn save_file(path: &Path, body: &Value) -> Result<()> {
    let content = serde_json::to_string_pretty(body)
        .map_err(|e| TenderStatError::parse(format!("failed to encode response: {e}")))?;
    std::fs::write(path, content).map_err(|e| TenderStatError::io(path, e))?;
    tracing::info!(path = %path.display(), "saved response");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn save_name_collapses_whitespace() {
        assert_eq!(default_save_name("PT  ACME\tIndonesia"), "PT ACME Indonesia.json");
        assert_eq!(default_save_name(" acme "), "acme.json");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(default_save_name("acme"));
        let body = json!([{ "id": 1, "tipePengadaan": "tender", "hargaNegosiasi": "Rp. 1.000,00" }]);

        save_file(&path, &body).expect("save");
        assert_eq!(load_file(&path).expect("load"), body);
    }

    #[test]
    fn load_reports_bad_json_and_missing_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[{").expect("write");
        assert!(matches!(load_file(&path), Err(TenderStatError::Parse { .. })));

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_file(&missing), Err(TenderStatError::Io { .. })));
    }
}
