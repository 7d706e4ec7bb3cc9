//! Append-only analysis history, stored as one JSON array.
//!
//! Every append rewrites the whole document. The rewrite happens under
//! `history.lock`, so concurrent appends from threads or processes sharing the
//! data directory are serialized and none is lost. A document that does not
//! parse is reported, never overwritten.

use crate::constants;
use crate::core::file_lock::StoreLock;
use crate::core::paths::AppPaths;
use crate::models::history::{AnalysisKind, HistoryEntry};
use crate::util::fs as app_fs;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::io;

/// Append one entry stamped with the current time. Returns the stored entry.
pub fn append_entry(
    paths: &AppPaths,
    kind: AnalysisKind,
    input: &str,
    output: &str,
    filename: Option<&str>,
) -> Result<HistoryEntry> {
    app_fs::ensure_dir(&paths.root, constants::ROOT_DIR_MODE)
        .with_context(|| format!("create data directory {}", paths.root.display()))?;
    let _lock = StoreLock::acquire(&paths.history_lock)?;

    let mut entries = load_history(paths)?;
    let entry = HistoryEntry {
        timestamp: Utc::now(),
        kind,
        input: input.to_string(),
        output: output.to_string(),
        filename: filename.map(str::to_string),
    };
    entries.push(entry.clone());

    let data = serde_json::to_vec_pretty(&entries).context("serialize history")?;
    app_fs::write_atomic(&paths.history_file, &data, constants::HISTORY_FILE_MODE)
        .with_context(|| format!("write history {}", paths.history_file.display()))?;

    tracing::debug!(kind = %kind, total = entries.len(), "history entry appended");
    Ok(entry)
}

/// All entries in insertion order; empty when nothing has been recorded yet.
pub fn load_history(paths: &AppPaths) -> Result<Vec<HistoryEntry>> {
    let data = match fs::read(&paths.history_file) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(e)
                .with_context(|| format!("read history {}", paths.history_file.display()))
        }
    };
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(&data).with_context(|| {
        format!(
            "parse history {} (file left untouched; fix or move it aside)",
            paths.history_file.display()
        )
    })
}

/// Newest first, at most `limit` entries.
pub fn newest_first(entries: Vec<HistoryEntry>, limit: Option<usize>) -> Vec<HistoryEntry> {
    let mut entries = entries;
    entries.reverse();
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

/// Delete the history document. Returns whether there was one.
pub fn clear_history(paths: &AppPaths) -> Result<bool> {
    if !paths.root.is_dir() {
        return Ok(false);
    }
    let _lock = StoreLock::acquire(&paths.history_lock)?;
    match fs::remove_file(&paths.history_file) {
        Ok(()) => {
            tracing::info!(path = %paths.history_file.display(), "history cleared");
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e)
            .with_context(|| format!("remove history {}", paths.history_file.display())),
    }
}
