//! Soft delete into `history/`, restore, history backup and retention GC.

use super::LotFileManager;
use super::audit::action;
use super::layout::{BACKUP_DIR, HISTORY_DIR, history_file_name};
use super::search::{FileEntry, sort_newest_first};
use crate::errors::{AppError, AppResult};
use crate::utils::path::{file_name_of, stem_of};
use chrono::{Duration as ChronoDuration, Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Result of the byte comparison run after every move or copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Integrity {
    Verified,
    Mismatch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftDeleteOutcome {
    pub history_path: PathBuf,
    pub integrity: Integrity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub restored_from: PathBuf,
    /// History entry the overwritten live document was moved to.
    pub displaced: Option<PathBuf>,
    pub integrity: Integrity,
}

fn compare(expected: &[u8], path: &Path) -> Integrity {
    match fs::read(path) {
        Ok(actual) if actual == expected => Integrity::Verified,
        Ok(_) => Integrity::Mismatch,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot re-read file for verification");
            Integrity::Mismatch
        }
    }
}

fn files_in(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

impl LotFileManager {
    /// Move `path` into the lot's `history/` with a `_YYYYMMDDTHHMMSS` suffix.
    pub fn soft_delete(&self, path: &Path, lot_number: &str, actor: &str) -> AppResult<SoftDeleteOutcome> {
        self.soft_delete_at(path, lot_number, actor, Local::now().naive_local())
    }

    /// [`LotFileManager::soft_delete`] with an explicit clock.
    pub fn soft_delete_at(
        &self,
        path: &Path,
        lot_number: &str,
        actor: &str,
        now: NaiveDateTime,
    ) -> AppResult<SoftDeleteOutcome> {
        self.require_privileged(actor, action::MOVE_TO_HISTORY, path)?;
        self.require_lot(lot_number)?;

        if !path.is_file() {
            return Err(AppError::NotFound(path.display().to_string()));
        }

        let original = fs::read(path)?;
        let history_dir = self.history_dir(lot_number);
        fs::create_dir_all(&history_dir)?;

        // Same-second deletes of one stem get the next free second.
        let stem = stem_of(path);
        let mut stamp = now;
        let mut target = history_dir.join(history_file_name(&stem, &stamp));
        while target.exists() {
            stamp += ChronoDuration::seconds(1);
            target = history_dir.join(history_file_name(&stem, &stamp));
        }

        let integrity = match fs::rename(path, &target) {
            Ok(()) => compare(&original, &target),
            Err(e) => {
                tracing::debug!(error = %e, "rename into history failed, copying instead");
                fs::copy(path, &target).map_err(|e| AppError::WriteFailed {
                    path: target.display().to_string(),
                    source: e,
                })?;
                let integrity = compare(&original, &target);
                if integrity == Integrity::Verified {
                    fs::remove_file(path)?;
                }
                integrity
            }
        };

        if integrity == Integrity::Mismatch {
            tracing::warn!(
                from = %path.display(),
                to = %target.display(),
                "history copy differs from the deleted document"
            );
        }

        self.audit_quiet(actor, action::MOVE_TO_HISTORY, &target);
        Ok(SoftDeleteOutcome {
            history_path: target,
            integrity,
        })
    }

    /// Copy the newest history entry of `original_path`'s stem back in place.
    /// A live document at `original_path` is soft-deleted first.
    pub fn restore_latest(
        &self,
        original_path: &Path,
        lot_number: &str,
        actor: &str,
    ) -> AppResult<RestoreOutcome> {
        self.require_privileged(actor, action::RESTORE_LATEST, original_path)?;
        self.require_lot(lot_number)?;

        let prefix = format!("{}_", stem_of(original_path));
        let mut candidates: Vec<(SystemTime, String, PathBuf)> = Vec::new();
        for p in files_in(&self.history_dir(lot_number))? {
            let name = file_name_of(&p);
            if !name.starts_with(&prefix) {
                continue;
            }
            let mtime = fs::metadata(&p)?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            candidates.push((mtime, name, p));
        }

        let (_, _, source) = candidates
            .into_iter()
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .ok_or_else(|| {
                AppError::NotFound(format!("no history entry for {}", original_path.display()))
            })?;

        let bytes = fs::read(&source)?;

        let displaced = if original_path.is_file() {
            let moved =
                self.soft_delete_at(original_path, lot_number, actor, Local::now().naive_local())?;
            if original_path.exists() {
                return Err(AppError::Other(format!(
                    "cannot preserve {} before restore (history copy {} differs)",
                    original_path.display(),
                    moved.history_path.display()
                )));
            }
            Some(moved.history_path)
        } else {
            None
        };

        if let Some(parent) = original_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, original_path).map_err(|e| AppError::WriteFailed {
            path: original_path.display().to_string(),
            source: e,
        })?;

        let integrity = compare(&bytes, original_path);
        if integrity == Integrity::Mismatch {
            tracing::warn!(
                from = %source.display(),
                to = %original_path.display(),
                "restored document differs from its history entry"
            );
        }

        self.audit_quiet(actor, action::RESTORE_LATEST, original_path);
        Ok(RestoreOutcome {
            restored_from: source,
            displaced,
            integrity,
        })
    }

    /// Entries directly under `history/` (never `backup/`), newest first.
    pub fn list_history(&self, lot_number: &str) -> AppResult<Vec<FileEntry>> {
        self.require_lot(lot_number)?;
        let mut entries = files_in(&self.history_dir(lot_number))?
            .iter()
            .map(|p| FileEntry::from_path(p))
            .collect::<AppResult<Vec<_>>>()?;
        sort_newest_first(&mut entries);
        Ok(entries)
    }

    /// Copy every `history/*.json` of every lot into `history/backup/`.
    /// Returns the number of files copied; identical backups are skipped.
    pub fn backup_all_history(&self) -> AppResult<usize> {
        let mut copied = 0;

        for lot_dir in self.lot_dirs()? {
            let history = lot_dir.join(HISTORY_DIR);
            let backup = history.join(BACKUP_DIR);

            for src in files_in(&history)? {
                if !src.extension().is_some_and(|e| e.eq_ignore_ascii_case("json")) {
                    continue;
                }
                let dest = backup.join(file_name_of(&src));
                let bytes = fs::read(&src)?;
                if fs::read(&dest).is_ok_and(|existing| existing == bytes) {
                    continue;
                }
                fs::create_dir_all(&backup)?;
                fs::write(&dest, &bytes)?;
                copied += 1;
            }
        }

        if copied > 0 {
            tracing::info!(copied, "history backed up");
            self.audit_quiet(self.user(), action::BACKUP_HISTORY, self.root());
        }
        Ok(copied)
    }

    /// Unlink history and backup files older than the retention window.
    pub fn gc_old_history(&self) -> AppResult<usize> {
        self.gc_old_history_at(SystemTime::now())
    }

    /// [`LotFileManager::gc_old_history`] with an explicit clock.
    pub fn gc_old_history_at(&self, now: SystemTime) -> AppResult<usize> {
        let window = Duration::from_secs(u64::from(self.retention_days()) * 24 * 60 * 60);
        let Some(cutoff) = now.checked_sub(window) else {
            return Ok(0);
        };

        let mut removed = 0;
        for lot_dir in self.lot_dirs()? {
            let history = lot_dir.join(HISTORY_DIR);
            for dir in [history.join(BACKUP_DIR), history] {
                for file in files_in(&dir)? {
                    let mtime = fs::metadata(&file)?.modified()?;
                    if mtime >= cutoff {
                        continue;
                    }
                    fs::remove_file(&file)?;
                    removed += 1;
                    tracing::info!(path = %file.display(), "expired history entry removed");
                    self.audit_quiet(self.user(), action::GC_HISTORY, &file);
                }
            }
        }
        Ok(removed)
    }
}
