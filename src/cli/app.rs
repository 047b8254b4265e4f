use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::commands::Commands;
use super::context::CliContext;
use super::dispatch::dispatch;
use super::output::OutputFormat;
use super::runtime::{init_logging, load_config};

/// Score page elements, decide whether to act on one, and learn from how it went
#[derive(Parser, Debug)]
#[command(name = "navis", author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Navis configuration (YAML); falls back to config/navis.yaml, then the user config dir
    #[arg(short, long, value_name = "FILE", env = "NAVIS_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Agent snapshot to restore from and save to; wins over the config file and NAVIS_SNAPSHOT_PATH
    #[arg(long, value_name = "FILE", global = true)]
    pub snapshot: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,

    /// Debug logging regardless of --log-level
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// How reports are written to stdout
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

pub async fn run() -> Result<()> {
    let cli = CliArgs::parse();
    init_logging(&cli.log_level, cli.debug)?;

    let mut loaded_config = load_config(cli.config.as_ref()).await?;
    if let Some(snapshot) = &cli.snapshot {
        loaded_config.config.snapshot_path = Some(snapshot.clone());
    }
    let cli_context = CliContext::new(loaded_config.config, loaded_config.path, cli.output);

    match dispatch(&cli, &cli_context).await {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("Command failed: {:#}", err);
            Err(err)
        }
    }
}
