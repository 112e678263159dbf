//! Listing and searching annotation documents.

use super::LotFileManager;
use super::layout::{FileName, HISTORY_DIR, MANIFEST_FILE, parse_file_name};
use crate::errors::{AppError, AppResult};
use crate::models::lot::is_valid_lot;
use crate::utils::path::file_name_of;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub file_path: PathBuf,
    pub lot_number: Option<String>,
    pub sequence: Option<u32>,
    pub created: DateTime<Local>,
    pub modified: DateTime<Local>,
    pub filename: String,
}

impl FileEntry {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let meta = fs::metadata(path)?;
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = meta.created().unwrap_or(modified);

        let filename = file_name_of(path);
        let parsed = parse_file_name(&filename);

        Ok(Self {
            file_path: path.to_path_buf(),
            lot_number: lot_of(path, &parsed),
            sequence: parsed.sequence(),
            created: DateTime::<Local>::from(created),
            modified: DateTime::<Local>::from(modified),
            filename,
        })
    }
}

/// Lot of a document: the legacy name prefix, else the nearest ancestor
/// directory that looks like a lot.
fn lot_of(path: &Path, parsed: &FileName) -> Option<String> {
    if let FileName::Legacy { lot, .. } = parsed {
        return Some(lot.clone());
    }
    path.ancestors()
        .skip(1)
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .find(|n| is_valid_lot(n))
}

/// Newest first; ties broken by path so the order is stable.
pub(crate) fn sort_newest_first(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| {
        b.created
            .cmp(&a.created)
            .then_with(|| a.file_path.cmp(&b.file_path))
    });
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

impl LotFileManager {
    /// Case-insensitive substring match against document file names under
    /// `<root>/<lot>/` (or the whole root). `history/` is never entered.
    pub fn search(&self, query: &str, lot_number: Option<&str>) -> AppResult<Vec<FileEntry>> {
        let base = match lot_number {
            Some(lot) => {
                self.require_lot(lot)?;
                let dir = self.lot_dir(lot);
                if !dir.is_dir() {
                    return Err(AppError::NotFound(dir.display().to_string()));
                }
                dir
            }
            None => {
                if !self.root().is_dir() {
                    return Ok(Vec::new());
                }
                self.root().to_path_buf()
            }
        };

        let needle = query.trim().to_lowercase();
        let mut found = Vec::new();
        collect_matches(&base, &needle, &mut found)?;

        let mut entries = found
            .iter()
            .map(|p| FileEntry::from_path(p))
            .collect::<AppResult<Vec<_>>>()?;
        sort_newest_first(&mut entries);
        entries.truncate(self.search_limit());

        tracing::debug!(query, results = entries.len(), "search finished");
        Ok(entries)
    }

    /// Live documents of a lot sorted by name, optionally followed by its
    /// history entries (newest first).
    pub fn list_lot(&self, lot_number: &str, include_history: bool) -> AppResult<Vec<FileEntry>> {
        self.require_lot(lot_number)?;
        let dir = self.lot_dir(lot_number);
        if !dir.is_dir() {
            return Err(AppError::NotFound(dir.display().to_string()));
        }

        let mut live = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if parse_file_name(&name).is_board_document() {
                live.push(FileEntry::from_path(&entry.path())?);
            }
        }
        live.sort_by(|a, b| a.filename.cmp(&b.filename));

        if include_history {
            live.extend(self.list_history(lot_number)?);
        }
        Ok(live)
    }
}

fn collect_matches(dir: &Path, needle: &str, out: &mut Vec<PathBuf>) -> AppResult<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?.collect::<Result<_, _>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        let ft = entry.file_type()?;

        if ft.is_dir() {
            if name.eq_ignore_ascii_case(HISTORY_DIR) {
                continue;
            }
            collect_matches(&path, needle, out)?;
        } else if ft.is_file()
            && is_json(&path)
            && name != MANIFEST_FILE
            && name.to_lowercase().contains(needle)
        {
            out.push(path);
        }
    }
    Ok(())
}
