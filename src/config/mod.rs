use crate::errors::{AppError, AppResult};
use crate::models::defect::DefectCatalog;
use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_storage_root")]
    pub storage_root: String,
    #[serde(default)]
    pub worker_no: String,
    #[serde(default)]
    pub privileged_users: Vec<String>,
    #[serde(default = "default_retention_days")]
    pub history_retention_days: u32,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "default_undo_depth")]
    pub undo_depth: usize,
    #[serde(default)]
    pub defect_list: Option<String>,
    #[serde(default = "default_select_radius")]
    pub select_radius: f64,
}

fn default_storage_root() -> String {
    Config::config_dir()
        .join("storage")
        .to_string_lossy()
        .to_string()
}
fn default_retention_days() -> u32 {
    365
}
fn default_search_limit() -> usize {
    100
}
fn default_undo_depth() -> usize {
    50
}
fn default_select_radius() -> f64 {
    20.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            worker_no: String::new(),
            privileged_users: Vec::new(),
            history_retention_days: default_retention_days(),
            search_limit: default_search_limit(),
            undo_depth: default_undo_depth(),
            defect_list: None,
            select_radius: default_select_radius(),
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("boardmark")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".boardmark")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("boardmark.conf")
    }

    /// Config rooted at `storage_root`, every other field at its default.
    pub fn with_root<P: AsRef<Path>>(storage_root: P) -> Self {
        Self {
            storage_root: storage_root.as_ref().to_string_lossy().to_string(),
            ..Self::default()
        }
    }

    /// Load configuration from `path` (or the standard file), or return defaults if not found
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_file);

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(cfg)
    }

    /// Write this configuration as YAML.
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path)?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.undo_depth == 0 {
            return Err(AppError::Config("undo_depth must be at least 1".into()));
        }
        if self.search_limit == 0 {
            return Err(AppError::Config("search_limit must be at least 1".into()));
        }
        if self.select_radius.is_nan() || self.select_radius <= 0.0 {
            return Err(AppError::Config("select_radius must be positive".into()));
        }
        if !self.storage_path().is_absolute() {
            return Err(AppError::Config(format!(
                "storage_root must be an absolute path, got '{}'",
                self.storage_root
            )));
        }
        Ok(())
    }

    /// Storage root with `~` expanded.
    pub fn storage_path(&self) -> PathBuf {
        expand_tilde(&self.storage_root)
    }

    pub fn is_privileged(&self, actor: &str) -> bool {
        let actor = actor.trim();
        !actor.is_empty() && self.privileged_users.iter().any(|u| u.trim() == actor)
    }

    pub fn defect_catalog(&self) -> DefectCatalog {
        let path = self.defect_list.as_deref().map(expand_tilde);
        DefectCatalog::load(path.as_deref())
    }
}
