use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::log::AuditLogic;
use crate::errors::AppResult;
use crate::files::LotFileManager;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Log { print: true, tail } = cmd {
        let files = LotFileManager::new(cfg);
        AuditLogic::print_log(&files, *tail)?;
    }

    Ok(())
}
