use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::files::LotFileManager;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Manifest { lot } = cmd {
        let files = LotFileManager::new(cfg);
        files.reload_manifest(lot)?;
        if let Some(manifest) = files.read_manifest(lot)? {
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
    }
    Ok(())
}
