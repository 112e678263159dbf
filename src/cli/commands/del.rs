use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::{Integrity, LotFileManager};
use crate::ui::messages;

/// Handle the `del` command: soft-delete one board document.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Del { lot, board, actor } = cmd {
        let files = LotFileManager::new(cfg);
        let actor = actor.as_deref().unwrap_or(cfg.worker_no.as_str());
        let path = files.board_path(lot, *board);

        let outcome = files.soft_delete(&path, lot, actor)?;
        if outcome.integrity == Integrity::Mismatch {
            messages::warning(format!(
                "History copy {} differs from the deleted document",
                outcome.history_path.display()
            ));
        }
        files.reload_manifest(lot)?;

        messages::success(format!(
            "Board {} of lot {} moved to {}",
            board,
            lot,
            outcome.history_path.display()
        ));
    }
    Ok(())
}
