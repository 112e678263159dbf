//! Append-only CSV operation log at the storage root.

use crate::errors::AppResult;
use chrono::Local;
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::Path;

pub const AUDIT_HEADER: [&str; 4] = ["timestamp", "user", "action", "path"];

/// Audit actions written by the file manager.
pub mod action {
    pub const INIT: &str = "init";
    pub const OPEN_FILE: &str = "open_file";
    pub const SAVE_FILE: &str = "save_file";
    pub const MOVE_TO_HISTORY: &str = "move_to_history";
    pub const RESTORE_LATEST: &str = "restore_latest";
    pub const UPDATE_MANIFEST: &str = "update_manifest";
    pub const BACKUP_HISTORY: &str = "backup_history";
    pub const GC_HISTORY: &str = "gc_history";
    pub const LOCK_FILE: &str = "lock_file";
    pub const UNLOCK_FILE: &str = "unlock_file";
    pub const PERMISSION_DENIED: &str = "permission_denied";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub user: String,
    pub action: String,
    pub path: String,
}

/// Append one row, creating the file (with header) when missing.
/// The file is opened and closed for every call.
pub fn append(log_path: &Path, user: &str, action: &str, target: &str) -> AppResult<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let needs_header = fs::metadata(log_path).map(|m| m.len() == 0).unwrap_or(true);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);

    if needs_header {
        wtr.write_record(AUDIT_HEADER)?;
    }

    let now = Local::now().to_rfc3339();
    wtr.write_record([now.as_str(), user, action, target])?;
    wtr.flush()?;
    Ok(())
}

/// All rows of the log, oldest first. A missing file reads as empty.
pub fn read_all(log_path: &Path) -> AppResult<Vec<AuditRecord>> {
    if !log_path.exists() {
        return Ok(Vec::new());
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(log_path)?;

    let mut out = Vec::new();
    for rec in rdr.deserialize() {
        out.push(rec?);
    }
    Ok(out)
}
