use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::LotFileManager;
use crate::ui::messages;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Search { query, lot } = cmd {
        let files = LotFileManager::new(cfg);
        let entries = files.search(query, lot.as_deref())?;

        if entries.is_empty() {
            messages::info(format!("No documents match '{}'", query));
            return Ok(());
        }

        print!("{}", super::entries_table(&entries).render());
        if entries.len() == files.search_limit() {
            messages::warning(format!(
                "Showing the first {} results (search_limit)",
                files.search_limit()
            ));
        }
    }
    Ok(())
}
