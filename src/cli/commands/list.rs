use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::LotFileManager;
use crate::ui::messages;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { lot, history } = cmd {
        let files = LotFileManager::new(cfg);
        let entries = files.list_lot(lot, *history)?;

        if entries.is_empty() {
            messages::info(format!("Lot {} has no documents", lot));
            return Ok(());
        }

        messages::header(format!("Lot {}", lot));
        print!("{}", super::entries_table(&entries).render());
    }
    Ok(())
}
