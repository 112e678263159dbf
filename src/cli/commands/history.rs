use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::LotFileManager;
use crate::ui::messages;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::History { lot } = cmd {
        let files = LotFileManager::new(cfg);
        let entries = files.list_history(lot)?;

        if entries.is_empty() {
            messages::info(format!("Lot {} has no history entries", lot));
            return Ok(());
        }

        messages::header(format!("History of lot {}", lot));
        print!("{}", super::entries_table(&entries).render());
    }
    Ok(())
}
