//! Loads candidate addresses from text, CSV, or JSON files.
//!
//! Nothing here validates address syntax: the orchestrator re-checks every
//! candidate regardless of where it came from. An unreadable or malformed
//! input file is a configuration error and aborts before any verification
//! starts.

use crate::core::error::{AppError, Result};
use serde_json::Value;
use std::path::Path;

/// Reads an ordered list of candidate addresses from `path`, dispatching
/// on the file extension (`.json`, `.csv`, anything else is plain text).
pub fn load_addresses(path: &Path) -> Result<Vec<String>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let addresses = match extension.as_deref() {
        Some("json") => load_json(path)?,
        Some("csv") => load_csv(path)?,
        _ => load_lines(path)?,
    };

    tracing::info!("Loaded {} candidate address(es) from {}", addresses.len(), path.display());
    Ok(addresses)
}

/// One address per line; blank lines and `#` comments are skipped.
fn load_lines(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Cannot read input file '{}': {}", path.display(), e)))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

/// Takes the `email`/`address` column when a header row names one,
/// otherwise the first column.
fn load_csv(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::Config(format!("Cannot read input file '{}': {}", path.display(), e)))?;

    let mut addresses = Vec::new();
    let mut column = 0;
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if index == 0 {
            if let Some(found) = record.iter().position(|field| {
                field.trim().eq_ignore_ascii_case("email")
                    || field.trim().eq_ignore_ascii_case("address")
            }) {
                column = found;
                continue;
            }
        }
        if let Some(field) = record.get(column) {
            let field = field.trim();
            if !field.is_empty() {
                addresses.push(field.to_string());
            }
        }
    }
    Ok(addresses)
}

/// An array of strings, or of objects carrying an `email`/`address` field.
fn load_json(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("Cannot read input file '{}': {}", path.display(), e)))?;
    let value: Value = serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Invalid JSON in '{}': {}", path.display(), e)))?;

    let entries = value.as_array().ok_or_else(|| {
        AppError::Config(format!(
            "Expected a JSON array of addresses in '{}'",
            path.display()
        ))
    })?;

    let mut addresses = Vec::new();
    for entry in entries {
        let address = match entry {
            Value::String(s) => Some(s.as_str()),
            Value::Object(map) => map
                .get("email")
                .or_else(|| map.get("address"))
                .and_then(Value::as_str),
            _ => None,
        };
        match address {
            Some(address) if !address.trim().is_empty() => {
                addresses.push(address.trim().to_string());
            }
            _ => {
                tracing::warn!("Skipping JSON entry without an address: {}", entry);
            }
        }
    }
    Ok(addresses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes()).expect("write temp file");
        (dir, path)
    }

    #[test]
    fn loads_plain_text_lines() {
        let (_dir, path) = write_temp(
            "input.txt",
            "a@example.com\n\n# comment\n  b@example.com  \nnot-an-email\n",
        );
        let addresses = load_addresses(&path).expect("load");
        assert_eq!(addresses, vec!["a@example.com", "b@example.com", "not-an-email"]);
    }

    #[test]
    fn loads_csv_with_header_column() {
        let (_dir, path) = write_temp(
            "input.csv",
            "name,email\nAlice,alice@example.com\nBob,bob@example.com\n",
        );
        let addresses = load_addresses(&path).expect("load");
        assert_eq!(addresses, vec!["alice@example.com", "bob@example.com"]);
    }

    #[test]
    fn loads_headerless_csv_first_column() {
        let (_dir, path) = write_temp("input.csv", "alice@example.com,extra\nbob@example.com,\n");
        let addresses = load_addresses(&path).expect("load");
        assert_eq!(addresses, vec!["alice@example.com", "bob@example.com"]);
    }

    #[test]
    fn loads_json_strings_and_objects() {
        let (_dir, path) = write_temp(
            "input.json",
            r#"["a@example.com", {"email": "b@example.com"}, {"address": "c@example.com"}, {"name": "no address"}]"#,
        );
        let addresses = load_addresses(&path).expect("load");
        assert_eq!(
            addresses,
            vec!["a@example.com", "b@example.com", "c@example.com"]
        );
    }

    #[test]
    fn rejects_non_array_json() {
        let (_dir, path) = write_temp("input.json", r#"{"email": "a@example.com"}"#);
        assert!(matches!(load_addresses(&path), Err(AppError::Config(_))));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = load_addresses(Path::new("/nonexistent/input.txt"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
