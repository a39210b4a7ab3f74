use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Longest filename accepted from a client.
const MAX_FILE_NAME_LEN: usize = 255;

/// A parsed JSON file, tagged with the name it was read from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonDocument {
    pub file: String,
    pub data: Value,
}

/// Check a client-supplied filename before it is joined onto a store directory.
///
/// Only `[A-Za-z0-9._-]` is allowed and the name may not start with `.`, which
/// rules out separators, `..` and hidden files in one go.
pub fn sanitize_file_name(name: &str) -> Result<&str, String> {
    if name.is_empty() {
        return Err("file name is empty".into());
    }
    if name.len() > MAX_FILE_NAME_LEN {
        return Err(format!("file name longer than {MAX_FILE_NAME_LEN} bytes"));
    }
    if name.starts_with('.') {
        return Err(format!("invalid file name: {name}"));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if !valid {
        return Err(format!("invalid file name: {name}"));
    }
    Ok(name)
}

/// Read every `*.json` entry of `dir`, in listing order.
///
/// A directory that cannot be listed yields an empty list. Files that cannot
/// be read or parsed are skipped so one bad record does not hide the rest.
pub async fn load_json_dir(dir: &Path) -> Vec<JsonDocument> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!("Cannot list {}: {}", dir.display(), e);
            return vec![];
        }
    };

    let mut docs = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Listing {} stopped early: {}", dir.display(), e);
                break;
            }
        };

        let Ok(file) = entry.file_name().into_string() else {
            continue;
        };
        if !file.ends_with(".json") {
            continue;
        }

        match read_json(&entry.path()).await {
            Ok(data) => docs.push(JsonDocument { file, data }),
            Err(e) => warn!("Skipping {}: {:#}", entry.path().display(), e),
        }
    }

    docs
}

async fn read_json(path: &Path) -> Result<Value> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Parse {}", path.display()))
}

/// Replace `path` with `contents` through a sibling temp file and a rename,
/// so readers see either the old file or the new one.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("No file name in {}", path.display()))?;
    let tmp = dir.join(format!(".{name}.{}.tmp", uuid::Uuid::new_v4()));

    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("Write {}", tmp.display()))?;

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e).with_context(|| format!("Replace {}", path.display()));
    }
    Ok(())
}
