//! File system utilities.

use crate::Result;
use serde::Serialize;
use std::path::Path;

/// Create a directory and all parent directories.
pub fn create_dir_all(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// The document is written next to the target first and then renamed over it,
/// so readers never observe a half-written file.
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    // Try rename first (same filesystem)
    if std::fs::rename(&tmp_path, path).is_err() {
        std::fs::copy(&tmp_path, path)?;
        std::fs::remove_file(&tmp_path)?;
    }

    tracing::debug!("Wrote {:?}", path);
    Ok(())
}
