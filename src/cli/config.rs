//! Config command implementation

use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::Path;

use starless::config::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print where the config file is
    Path,

    /// Print the effective configuration
    Show,

    /// Write the commented default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

pub fn config_command(config: &Config, explicit: Option<&Path>, action: &ConfigAction) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::global_config_path);

    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let content =
                toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;
            print!("{}", content);
            if let Some(settings_path) = config.storage.resolved_path() {
                println!();
                println!("# settings stored in {}", settings_path.display());
            }
        }
        ConfigAction::Init { force } => {
            if *force && path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
            if !Config::init_at(&path)? {
                println!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
            }
        }
    }

    Ok(())
}
