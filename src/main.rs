use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use starless::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "starless")]
#[command(about = "Starless - settings and runner for the starnet++ star removal tool")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.starless/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one setting (toolPath, outputFilename, tempFileName, autoScroll)
    Get { key: String },

    /// Change one setting
    Set { key: String, value: String },

    /// Put one setting, or all of them, back to the default
    Reset { key: Option<String> },

    /// Show every setting
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run starnet++ on an image using the current settings
    Run {
        /// Image to process (copied next to the tool before the run)
        input: PathBuf,

        /// Tile stride (overrides runner.stride)
        #[arg(long)]
        stride: Option<u32>,

        /// Print events as JSON lines
        #[arg(long)]
        json: bool,

        /// Leave the staged input file in place afterwards
        #[arg(long)]
        keep_input: bool,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: cli::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // `config init --config new.toml` must work before the file exists
    let config = match (&cli.command, cli.config.as_deref()) {
        (Commands::Config { .. }, Some(path)) if !path.exists() => Config::default(),
        (_, path) => Config::load_from(path)?,
    };

    // Initialize logging
    let log_level = config.logging.effective_level(cli.verbose).to_string();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Config { action } = &cli.command {
        return cli::config::config_command(&config, cli.config.as_deref(), action);
    }

    let store = config.storage.open_store();

    match cli.command {
        Commands::Get { key } => cli::settings::get_command(&store, &key)?,
        Commands::Set { key, value } => cli::settings::set_command(&store, &key, &value)?,
        Commands::Reset { key } => cli::settings::reset_command(&store, key.as_deref())?,
        Commands::List { json } => cli::settings::list_command(&store, json)?,
        Commands::Run {
            input,
            stride,
            json,
            keep_input,
        } => {
            let options = cli::run::RunOptions {
                input,
                stride,
                json,
                keep_input,
            };
            cli::run::run_command(&store, &config, options).await?;
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
