//! `lotInfo.json`: advisory summary of live and removed documents.

use super::LotFileManager;
use super::attrs;
use super::audit::action;
use super::document::write_replacing;
use super::layout::{FileName, MANIFEST_FILE, parse_file_name};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

const WRITE_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotManifest {
    #[serde(default)]
    pub json_list: Vec<String>,
    #[serde(default)]
    pub remove_list: Vec<String>,
}

fn names_in(dir: &Path, keep: impl Fn(&FileName) -> bool) -> AppResult<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if keep(&parse_file_name(&name)) {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

fn write_with_retry(path: &Path, bytes: &[u8]) -> AppResult<()> {
    let mut attempt = 1;
    loop {
        match write_replacing(path, bytes) {
            Ok(()) => return Ok(()),
            Err(e) if attempt < WRITE_ATTEMPTS => {
                tracing::warn!(path = %path.display(), attempt, error = %e, "manifest write failed, retrying");
                thread::sleep(RETRY_BACKOFF);
                attempt += 1;
            }
            Err(e) => {
                return Err(AppError::WriteFailed {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        }
    }
}

impl LotFileManager {
    pub fn manifest_path(&self, lot_number: &str) -> std::path::PathBuf {
        self.lot_dir(lot_number).join(MANIFEST_FILE)
    }

    /// Scan the live directory and `history/` and build the manifest.
    pub fn scan_manifest(&self, lot_number: &str) -> AppResult<LotManifest> {
        self.require_lot(lot_number)?;
        let dir = self.lot_dir(lot_number);
        if !dir.is_dir() {
            return Err(AppError::NotFound(dir.display().to_string()));
        }

        Ok(LotManifest {
            json_list: names_in(&dir, |f| matches!(f, FileName::Current(_)))?,
            remove_list: names_in(&self.history_dir(lot_number), |f| {
                matches!(f, FileName::History { .. })
            })?,
        })
    }

    /// Regenerate `lotInfo.json` from the directory and return its `json_list`.
    pub fn reload_manifest(&self, lot_number: &str) -> AppResult<Vec<String>> {
        let manifest = self.scan_manifest(lot_number)?;
        let path = self.manifest_path(lot_number);

        let mut bytes = serde_json::to_vec_pretty(&manifest)?;
        bytes.push(b'\n');

        attrs::unhide_if_exists(&path);
        let written = write_with_retry(&path, &bytes);
        attrs::set_hidden(&path, true);
        written?;

        self.audit_quiet(self.user(), action::UPDATE_MANIFEST, &path);
        Ok(manifest.json_list)
    }

    /// Parsed `lotInfo.json`, `None` when the lot has none yet.
    pub fn read_manifest(&self, lot_number: &str) -> AppResult<Option<LotManifest>> {
        self.require_lot(lot_number)?;
        let path = self.manifest_path(lot_number);
        if !path.is_file() {
            return Ok(None);
        }
        let text = fs::read_to_string(&path)?;
        let text = text.trim_start_matches('\u{feff}');
        Ok(Some(serde_json::from_str(text)?))
    }
}
