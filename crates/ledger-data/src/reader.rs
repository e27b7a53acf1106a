//! Dump file discovery and loading.
//!
//! Each wallet is exported as one plain-text `.txt` file; the file stem is the
//! wallet identifier carried by every record parsed from it.

use std::path::{Path, PathBuf};

use ledger_core::error::{LedgerError, Result};
use tracing::{debug, warn};

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.txt` dumps directly inside `input_dir`, sorted by path.
pub fn find_dump_files(input_dir: &Path) -> Result<Vec<PathBuf>> {
    if !input_dir.is_dir() {
        warn!("Input directory does not exist: {}", input_dir.display());
        return Err(LedgerError::InputDirNotFound(input_dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input_dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "txt")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    debug!("Found {} dump files in {}", files.len(), input_dir.display());
    Ok(files)
}

/// Wallet identifier for a dump: its file stem.
pub fn wallet_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a dump into trimmed lines.
///
/// The whole file is read up front; a file that cannot be opened or is not
/// valid UTF-8 fails as a unit.
pub fn read_dump(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path).map_err(|source| LedgerError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().map(|l| l.trim().to_string()).collect())
}

/// Lines mentioning a failed transaction are dropped everywhere.
pub fn is_failed_line(line: &str) -> bool {
    line.contains("Failed") || line.contains("failed")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
