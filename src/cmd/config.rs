//! Configuration view and validation commands: `taskdesk config`.

use anyhow::Result;

use super::super::ConfigCommands;
use taskdesk::config::{Config, TaskdeskToml};
use taskdesk::ui::icons;

pub fn cmd_config(config: &Config, command: Option<ConfigCommands>) -> Result<()> {
    let config_path = &config.config_path;

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Taskdesk Configuration");
            println!("======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No taskdesk.toml found at {}", config_path.display());
                println!("Using default configuration.");
            }
            println!();

            let toml = &config.toml;
            println!("[api]");
            println!("  base_url = \"{}\"", toml.api.base_url);
            println!("  timeout_secs = {}", toml.api.timeout_secs);
            println!();
            println!("[session]");
            println!("  persist = {}", toml.session.persist);
            if let Some(path) = &toml.session.credential_file {
                println!("  credential_file = \"{}\"", path.display());
            }
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("  api_url = \"{}\"", config.api_url());
            println!("  timeout = {}s", config.timeout().as_secs());
            if config.persist_session() {
                println!("  credential_file = \"{}\"", config.credential_path().display());
            } else {
                println!("  credential_file = (not persisted)");
            }
            println!();

            if !config_path.exists() {
                println!("Run 'taskdesk config init' to create a taskdesk.toml file.");
                println!();
            }
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let warnings = config.validate();
            if warnings.is_empty() {
                if config_path.exists() {
                    println!("{}Configuration is valid.", icons::CHECK);
                } else {
                    println!("No taskdesk.toml found. Using defaults (valid).");
                }
            } else {
                println!("{}Configuration warnings:", icons::WARN);
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("taskdesk.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            TaskdeskToml::default().save(config_path)?;

            println!("Created taskdesk.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs");
            println!("  - [session] persist, credential_file");
            println!();
        }
    }

    Ok(())
}
