use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::{Integrity, LotFileManager};
use crate::ui::messages;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Restore { lot, board, actor } = cmd {
        let files = LotFileManager::new(cfg);
        let actor = actor.as_deref().unwrap_or(cfg.worker_no.as_str());
        let path = files.board_path(lot, *board);

        let outcome = files.restore_latest(&path, lot, actor)?;
        if outcome.integrity == Integrity::Mismatch {
            messages::warning(format!(
                "Restored document differs from {}",
                outcome.restored_from.display()
            ));
        }
        if let Some(previous) = &outcome.displaced {
            messages::info(format!("Previous live version kept as {}", previous.display()));
        }
        files.reload_manifest(lot)?;

        messages::success(format!(
            "Restored {} from {}",
            path.display(),
            outcome.restored_from.display()
        ));
    }
    Ok(())
}
