// Append-only JSONL logs and final result output

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use shelfscout_scanner::SiteResult;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// One JSON record per line, appended as sites complete.
#[derive(Debug, Clone)]
pub struct JsonlLog {
    path: PathBuf,
}

impl JsonlLog {
    /// Open a log that keeps any existing records
    pub fn append(path: &Path) -> Result<Self, String> {
        ensure_parent(path)?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Open a log, discarding records from an earlier run
    pub fn truncate(path: &Path) -> Result<Self, String> {
        ensure_parent(path)?;
        File::create(path)
            .map_err(|e| format!("Failed to reset {}: {}", path.display(), e))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write<T: Serialize>(&self, record: &T) -> Result<(), String> {
        let line = serde_json::to_string(record)
            .map_err(|e| format!("Failed to serialize record: {}", e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("Failed to open {}: {}", self.path.display(), e))?;

        writeln!(file, "{}", line)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }

    /// Snapshot of a finished site, stamped with the time it was recorded.
    pub fn write_site(&self, result: &SiteResult) -> Result<(), String> {
        let mut record = result.to_value();
        if let Value::Object(ref mut map) = record {
            map.insert("recorded_at".to_string(), json!(Utc::now().to_rfc3339()));
        }
        self.write(&record)
    }

    /// Just the product URLs discovered for a site.
    pub fn write_product_urls(&self, result: &SiteResult) -> Result<(), String> {
        self.write(&json!({
            "brand": result.brand,
            "site_url": result.site_url,
            "product_urls": result.product_urls,
        }))
    }
}

/// Write the full result set as a pretty-printed JSON array
pub fn write_results(path: &Path, results: &[SiteResult]) -> Result<(), String> {
    ensure_parent(path)?;
    let file = File::create(path)
        .map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results)
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    writer
        .flush()
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))
}

fn ensure_parent(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e)),
        _ => Ok(()),
    }
}
