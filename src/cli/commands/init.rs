use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::LotFileManager;
use crate::files::audit::action;
use crate::ui::messages;
use std::fs;
use std::path::PathBuf;

/// Handle the `init` command
///
/// Creates the configuration file (when missing) and the storage root.
/// An existing configuration file is never overwritten.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let path = cli
        .config
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(Config::config_file);

    messages::info("Initializing boardmark…");

    if path.exists() {
        messages::info(format!("Config file : {} (kept)", path.display()));
    } else {
        cfg.save(&path)?;
        messages::success(format!("Config file : {}", path.display()));
    }

    cfg.validate()?;
    let root = cfg.storage_path();
    fs::create_dir_all(&root)?;
    messages::success(format!("Storage root: {}", root.display()));

    let files = LotFileManager::new(cfg);
    if let Err(e) = files.append_audit(files.user(), action::INIT, &root.to_string_lossy()) {
        messages::warning(format!("Failed to write operation log: {}", e));
    }

    messages::success("boardmark initialization completed!");
    Ok(())
}
