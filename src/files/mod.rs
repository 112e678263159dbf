//! Lot-directory file manager: layout, naming, document I/O, soft-delete
//! history, search, manifest and the audit log.
//!
//! The manager owns no board state. Every call goes to disk, so the
//! directory listing is always the ground truth.

pub mod attrs;
pub mod audit;
pub mod document;
pub mod encoding;
pub mod history;
pub mod layout;
pub mod lock;
pub mod manifest;
pub mod search;

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::lot::is_valid_lot;
use layout::{BACKUP_DIR, FileName, HISTORY_DIR, board_file_name, parse_file_name};
use lock::LockSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use history::{Integrity, RestoreOutcome, SoftDeleteOutcome};
pub use manifest::LotManifest;
pub use search::FileEntry;

#[derive(Debug)]
pub struct LotFileManager {
    root: PathBuf,
    user: String,
    privileged: Vec<String>,
    retention_days: u32,
    search_limit: usize,
    locks: LockSet,
}

impl LotFileManager {
    pub fn new(cfg: &Config) -> Self {
        Self {
            root: cfg.storage_path(),
            user: cfg.worker_no.trim().to_string(),
            privileged: cfg
                .privileged_users
                .iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect(),
            retention_days: cfg.history_retention_days,
            search_limit: cfg.search_limit.max(1),
            locks: LockSet::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Worker recorded in the audit log for non-privileged operations.
    pub fn user(&self) -> &str {
        if self.user.is_empty() {
            "unknown"
        } else {
            &self.user
        }
    }

    pub fn set_user(&mut self, user: &str) {
        self.user = user.trim().to_string();
    }

    pub fn search_limit(&self) -> usize {
        self.search_limit
    }

    pub fn validate_lot(&self, lot_number: &str) -> bool {
        is_valid_lot(lot_number)
    }

    pub(crate) fn require_lot(&self, lot_number: &str) -> AppResult<()> {
        if self.validate_lot(lot_number) {
            Ok(())
        } else {
            Err(AppError::InvalidLotNumber(lot_number.to_string()))
        }
    }

    pub fn lot_dir(&self, lot_number: &str) -> PathBuf {
        self.root.join(lot_number)
    }

    pub fn history_dir(&self, lot_number: &str) -> PathBuf {
        self.lot_dir(lot_number).join(HISTORY_DIR)
    }

    pub fn backup_dir(&self, lot_number: &str) -> PathBuf {
        self.history_dir(lot_number).join(BACKUP_DIR)
    }

    pub fn audit_path(&self) -> PathBuf {
        self.root.join(layout::AUDIT_FILE)
    }

    pub fn board_path(&self, lot_number: &str, board: u32) -> PathBuf {
        self.lot_dir(lot_number).join(board_file_name(board))
    }

    /// Create `<root>/<lot>/history/backup/` and return the lot directory.
    pub fn ensure_layout(&self, lot_number: &str) -> AppResult<PathBuf> {
        self.require_lot(lot_number)?;
        let dir = self.lot_dir(lot_number);
        fs::create_dir_all(self.backup_dir(lot_number))?;
        Ok(dir)
    }

    /// Board numbers of the current-generation documents, ascending.
    pub fn existing_boards(&self, lot_number: &str) -> AppResult<Vec<u32>> {
        self.require_lot(lot_number)?;
        let dir = self.lot_dir(lot_number);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut numbers = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let FileName::Current(n) = parse_file_name(&entry.file_name().to_string_lossy()) {
                numbers.push(n);
            }
        }
        numbers.sort_unstable();
        numbers.dedup();
        Ok(numbers)
    }

    /// One greater than the largest `NNNN` already present.
    pub fn next_sequence(&self, lot_number: &str) -> AppResult<u32> {
        Ok(self
            .existing_boards(lot_number)?
            .last()
            .map_or(1, |n| n + 1))
    }

    pub fn check_privileged(&self, actor: &str) -> AppResult<()> {
        let actor = actor.trim();
        if !actor.is_empty() && self.privileged.iter().any(|u| u == actor) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied(format!(
                "'{}' is not a privileged user",
                actor
            )))
        }
    }

    /// Privilege check that leaves a failure record in the audit log.
    pub(crate) fn require_privileged(&self, actor: &str, action: &str, path: &Path) -> AppResult<()> {
        if let Err(e) = self.check_privileged(actor) {
            self.audit_quiet(
                actor,
                &format!("{}:{}", audit::action::PERMISSION_DENIED, action),
                path,
            );
            return Err(e);
        }
        Ok(())
    }

    pub fn append_audit(&self, user: &str, action: &str, path: &str) -> AppResult<()> {
        audit::append(&self.audit_path(), user, action, path)
    }

    /// Audit failures never fail the operation they describe.
    pub(crate) fn audit_quiet(&self, user: &str, action: &str, path: &Path) {
        if let Err(e) = self.append_audit(user, action, &path.to_string_lossy()) {
            tracing::warn!(action, path = %path.display(), error = %e, "failed to write audit log");
        }
    }

    pub fn read_audit(&self) -> AppResult<Vec<audit::AuditRecord>> {
        audit::read_all(&self.audit_path())
    }

    /// Take an advisory lock. Returns false when the path is already held.
    pub fn acquire_lock(&self, path: &Path) -> bool {
        let acquired = self.locks.acquire(path);
        if acquired {
            self.audit_quiet(self.user(), audit::action::LOCK_FILE, path);
        }
        acquired
    }

    pub fn release_lock(&self, path: &Path) -> bool {
        let released = self.locks.release(path);
        if released {
            self.audit_quiet(self.user(), audit::action::UNLOCK_FILE, path);
        }
        released
    }

    pub fn is_locked(&self, path: &Path) -> bool {
        self.locks.is_locked(path)
    }

    pub(crate) fn locks(&self) -> &LockSet {
        &self.locks
    }

    pub(crate) fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Lot directories directly under the root, sorted by name.
    pub(crate) fn lot_dirs(&self) -> AppResult<Vec<PathBuf>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut dirs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }
}
