//! Console rendering of controller notifications.

use super::messages;
use crate::core::controller::EventSink;
use crate::errors::ErrorKind;
use std::path::{Path, PathBuf};

/// Prints errors and saves as they happen and counts them for the final
/// summary of an interactive session.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    pub errors: usize,
    pub saves: Vec<PathBuf>,
    pub state_changes: usize,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for ConsoleSink {
    fn notify_state_changed(&mut self) {
        self.state_changes += 1;
    }

    fn notify_error(&mut self, kind: ErrorKind, message: &str) {
        self.errors += 1;
        messages::kind_error(kind, message);
    }

    fn notify_saved(&mut self, path: &Path) {
        messages::success(format!("saved {}", path.display()));
        self.saves.push(path.to_path_buf());
    }
}
