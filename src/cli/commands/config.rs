use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages;
use std::path::Path;
use std::process::Command;

fn default_editor() -> String {
    std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(target_os = "windows") {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        })
}

fn run_editor(editor: &str, path: &Path) -> bool {
    matches!(Command::new(editor).arg(path).status(), Ok(s) if s.success())
}

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config, path: &Path) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        if *print_config {
            messages::header(format!("Configuration ({})", path.display()));
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *edit_config {
            if !path.exists() {
                cfg.save(path)?;
            }

            let fallback = default_editor();
            let chosen = editor.clone().unwrap_or_else(|| fallback.clone());

            if run_editor(&chosen, path) {
                messages::success(format!("Configuration file edited using '{}'", chosen));
            } else if chosen != fallback {
                messages::warning(format!(
                    "Editor '{}' not available, falling back to '{}'",
                    chosen, fallback
                ));
                if run_editor(&fallback, path) {
                    messages::success(format!(
                        "Configuration file edited using fallback '{}'",
                        fallback
                    ));
                } else {
                    messages::error(format!(
                        "Failed to edit configuration file using fallback '{}'",
                        fallback
                    ));
                }
            } else {
                messages::error(format!("Failed to edit configuration file using '{}'", chosen));
            }

            // Surface mistakes right after editing rather than at next use.
            if let Err(e) = Config::load(Some(path)).and_then(|c| c.validate()) {
                messages::warning(format!("Edited configuration is not valid: {}", e));
            }
        }
    }

    Ok(())
}
