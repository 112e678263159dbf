//! Advisory in-process file locks. They guard against re-entrancy of the
//! engine itself (save during save) and make no claim against other processes.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct LockSet {
    held: RefCell<HashSet<PathBuf>>,
}

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when `path` is already held.
    pub fn acquire(&self, path: &Path) -> bool {
        self.held.borrow_mut().insert(path.to_path_buf())
    }

    /// Returns false when `path` was not held.
    pub fn release(&self, path: &Path) -> bool {
        self.held.borrow_mut().remove(path)
    }

    pub fn is_locked(&self, path: &Path) -> bool {
        self.held.borrow().contains(path)
    }

    /// Scoped lock, released on drop. `None` when already held.
    pub fn guard<'a>(&'a self, path: &Path) -> Option<LockGuard<'a>> {
        self.acquire(path).then(|| LockGuard {
            set: self,
            path: path.to_path_buf(),
        })
    }
}

pub struct LockGuard<'a> {
    set: &'a LockSet,
    path: PathBuf,
}

impl LockGuard<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.set.release(&self.path);
    }
}
