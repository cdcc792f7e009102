//! Loading annotation records from disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use inkburn::record::records_from_value;
use inkburn::ParsedRecords;
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Loads records from a JSON file holding an array of records, or from a
/// directory holding one page record per `.json` file.
pub fn load_annotations(path: &Path) -> Result<ParsedRecords> {
    if path.is_dir() {
        load_directory(path)
    } else {
        load_file(path)
    }
}

pub fn load_file(path: &Path) -> Result<ParsedRecords> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read annotations from {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    records_from_value(value).with_context(|| format!("Invalid annotations in {}", path.display()))
}

/// Reads every `.json` file in `dir`, in file name order.
///
/// A file may hold a full record or just its `data` object. The page comes
/// from the record's `page` field, else from a `page_N` suffix in the file
/// name, else defaults to 1. Unreadable files are skipped.
pub fn load_directory(dir: &Path) -> Result<ParsedRecords> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .collect();
    files.sort();

    let mut values = Vec::with_capacity(files.len());
    for file in &files {
        let value = match fs::read_to_string(file)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str::<Value>(&text).map_err(anyhow::Error::from))
        {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping unreadable annotation file {}: {}", file.display(), e);
                continue;
            }
        };
        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        debug!("Loaded annotations from {}", file.display());
        values.push(into_record(value, page_from_file_name(stem)));
    }

    records_from_value(Value::Array(values))
        .with_context(|| format!("Invalid annotations in {}", dir.display()))
}

/// Wraps a bare `data` object into a record and fills in a missing page
fn into_record(value: Value, file_page: Option<i64>) -> Value {
    let page = file_page.unwrap_or(1);
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.entry("page").or_insert_with(|| json!(page));
            Value::Object(map)
        }
        Value::Object(map) => json!({ "page": page, "data": map }),
        other => other,
    }
}

/// `essay_page_3` -> 3
pub fn page_from_file_name(stem: &str) -> Option<i64> {
    let (_, digits) = stem.rsplit_once("page_")?;
    digits.parse().ok()
}

/// File name for the burned copy of `input`: `<stem>_annotated.pdf`
pub fn annotated_file_name(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    PathBuf::from(format!("{stem}_annotated.pdf"))
}
