// JSON / JSONL data file reading

use eyre::{Context, Result, eyre};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Read all rows from a JSONL file, one JSON value per line
///
/// Blank lines are ignored. Lines that fail to read or parse are skipped with
/// a warning so one bad row does not hide the rest of the file.
pub fn read_jsonl(path: &Path) -> Result<Vec<Value>> {
    let file = File::open(path).with_context(|| format!("Failed to open JSONL file {:?}", path))?;
    let reader = BufReader::new(file);
    let mut rows = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(row) => rows.push(row),
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse JSON, skipping"
                );
            }
        }
    }

    info!(file = ?path, count = rows.len(), "Loaded rows from JSONL");
    Ok(rows)
}

/// Read a JSON file holding an array of rows
pub fn read_json_array(path: &Path) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read JSON file {:?}", path))?;
    let value: Value = serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON file {:?}", path))?;

    match value {
        Value::Array(rows) => {
            info!(file = ?path, count = rows.len(), "Loaded rows from JSON");
            Ok(rows)
        }
        other => Err(eyre!(
            "Expected a JSON array in {:?}, found {}",
            path,
            json_kind(&other)
        )),
    }
}

/// Dispatch on extension: `.jsonl` is line-delimited, anything else is a JSON array
pub fn read_rows(path: &Path) -> Result<Vec<Value>> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("jsonl") => read_jsonl(path),
        _ => read_json_array(path),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
