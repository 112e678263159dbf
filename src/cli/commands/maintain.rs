use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::LotFileManager;
use crate::ui::messages;

/// Handle the `maintain` command: history backup, then retention cleanup.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Maintain { no_gc } = cmd {
        let files = LotFileManager::new(cfg);

        let copied = files.backup_all_history()?;
        messages::success(format!("{} history file(s) backed up", copied));

        if !*no_gc {
            let removed = files.gc_old_history()?;
            messages::success(format!(
                "{} expired history file(s) removed (retention {} days)",
                removed, cfg.history_retention_days
            ));
        }
    }
    Ok(())
}
