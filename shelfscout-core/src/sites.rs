// Site definition loading
//
// The operator supplies a JSON array of rows. `brand`, `url` and
// `product_sitemaps` are required on every row; any other key is carried
// through as metadata.

use serde_json::{Map, Value};
use shelfscout_scanner::SiteTarget;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const REQUIRED_KEYS: [&str; 3] = ["brand", "url", "product_sitemaps"];
const PRIMARY_SITEMAP_KEY: &str = "primary_sitemap";
const LIST_SEPARATORS: [char; 3] = ['\n', ',', '|'];

/// Expand a leading `~` in a user supplied path
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

/// Load site definitions from a JSON file
pub fn load_sites_from_file(path: &Path) -> Result<Vec<SiteTarget>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read sites file {}: {}", path.display(), e))?;

    parse_sites(&content).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Parse site definitions from JSON text
pub fn parse_sites(content: &str) -> Result<Vec<SiteTarget>, String> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| format!("Invalid sites JSON: {}", e))?;

    let rows = value
        .as_array()
        .ok_or_else(|| "Sites JSON must be an array of objects".to_string())?;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let row = row
                .as_object()
                .ok_or_else(|| format!("Row {} is not an object", index + 1))?;
            parse_row(row).map_err(|e| format!("Row {}: {}", index + 1, e))
        })
        .collect()
}

fn parse_row(row: &Map<String, Value>) -> Result<SiteTarget, String> {
    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !row.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing required keys: {}", missing.join(", ")));
    }

    let brand = scalar_text(&row["brand"]);
    let site_url = scalar_text(&row["url"]);
    let sitemap_urls = parse_list_cell(&row["product_sitemaps"]);
    let primary_sitemap = row
        .get(PRIMARY_SITEMAP_KEY)
        .map(parse_list_cell)
        .and_then(|candidates| candidates.into_iter().next());

    let metadata: BTreeMap<String, Value> = row
        .iter()
        .filter(|(key, value)| {
            !REQUIRED_KEYS.contains(&key.as_str()) && *key != PRIMARY_SITEMAP_KEY && !value.is_null()
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(SiteTarget::new(brand, site_url, sitemap_urls)
        .with_primary_sitemap(primary_sitemap)
        .with_metadata(metadata))
}

/// Parse a cell holding one or more URLs.
///
/// Accepts a JSON array, a string containing a JSON array, or a plain string
/// split on the first separator found (newline, comma, pipe).
pub fn parse_list_cell(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(scalar_text)
            .filter(|item| !item.is_empty())
            .collect(),
        Value::String(text) => parse_list_text(text),
        other => vec![other.to_string()],
    }
}

fn parse_list_text(text: &str) -> Vec<String> {
    let stripped = text.trim();
    if stripped.is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Value>(stripped) {
        Ok(Value::Array(items)) => items
            .iter()
            .map(scalar_text)
            .filter(|item| !item.is_empty())
            .collect(),
        Ok(Value::String(inner)) => vec![inner.trim().to_string()],
        Ok(_) => vec![stripped.to_string()],
        Err(_) => match LIST_SEPARATORS.iter().find(|sep| stripped.contains(**sep)) {
            Some(sep) => stripped
                .split(*sep)
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            None => vec![stripped.to_string()],
        },
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.trim().to_string(),
        other => other.to_string(),
    }
}
