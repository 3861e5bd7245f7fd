// Runtime configuration helpers for the CLI

use eyre::{Result, eyre};
use std::path::PathBuf;

/// `$XDG_DATA_HOME/listview` (or the platform equivalent), falling back to
/// the current directory when no data directory is known
pub fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("listview"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Split a `FIELD=VALUE` argument
pub fn parse_pair(raw: &str) -> Result<(String, String)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| eyre!("Expected FIELD=VALUE, got '{}'", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(eyre!("Missing field name in '{}'", raw));
    }
    Ok((field.to_string(), value.to_string()))
}
