#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use boardmark::config::Config;
use boardmark::core::controller::{AnnotationController, EventSink};
use boardmark::errors::ErrorKind;
use boardmark::files::LotFileManager;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const LOT: &str = "1234567-10";
pub const WORKER: &str = "A001";
pub const ADMIN: &str = "Q900";

pub fn rti() -> Command {
    cargo_bin_cmd!("boardmark")
}

/// Storage root and configuration inside a fresh temp dir.
pub struct TestEnv {
    pub dir: TempDir,
    pub cfg: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut cfg = Config::with_root(dir.path().join("storage"));
        cfg.worker_no = WORKER.to_string();
        cfg.privileged_users = vec![ADMIN.to_string()];
        Self { dir, cfg }
    }

    /// Same environment with `worker` as the acting user.
    pub fn as_worker(&self, worker: &str) -> Config {
        let mut cfg = self.cfg.clone();
        cfg.worker_no = worker.to_string();
        cfg
    }

    pub fn root(&self) -> PathBuf {
        self.cfg.storage_path()
    }

    pub fn lot_dir(&self) -> PathBuf {
        self.root().join(LOT)
    }

    pub fn files(&self) -> LotFileManager {
        LotFileManager::new(&self.cfg)
    }

    pub fn controller(&self) -> AnnotationController<RecordingSink> {
        AnnotationController::new(&self.cfg, RecordingSink::default()).expect("valid config")
    }

    /// Write the configuration file used by CLI tests.
    pub fn write_config(&self) -> PathBuf {
        let path = self.dir.path().join("boardmark.conf");
        self.cfg.save(&path).expect("write config");
        path
    }

    pub fn config_arg(&self) -> String {
        self.write_config().to_string_lossy().to_string()
    }
}

/// Write a raw document file, creating parent directories.
pub fn write_raw(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, bytes).expect("write file");
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = fs::read_to_string(path).expect("read json");
    serde_json::from_str(&text).expect("parse json")
}

/// Sink that records every notification for assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub errors: Vec<(ErrorKind, String)>,
    pub saved: Vec<PathBuf>,
    pub state_changes: usize,
}

impl RecordingSink {
    pub fn kinds(&self) -> Vec<ErrorKind> {
        self.errors.iter().map(|(k, _)| *k).collect()
    }
}

impl EventSink for RecordingSink {
    fn notify_state_changed(&mut self) {
        self.state_changes += 1;
    }

    fn notify_error(&mut self, kind: ErrorKind, message: &str) {
        self.errors.push((kind, message.to_string()));
    }

    fn notify_saved(&mut self, path: &Path) {
        self.saved.push(path.to_path_buf());
    }
}
