use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tokio::fs;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::config::NavisConfig;

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Clone, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration, environment overrides included
    Show,

    /// Validate the configuration file
    Validate,

    /// Print where configuration and the agent snapshot are read from
    Path,
}

pub async fn cmd_config(args: ConfigArgs, ctx: &CliContext) -> Result<()> {
    let path = ctx.config_path().to_path_buf();
    match args.action {
        ConfigAction::Show => {
            if !print_structured(ctx.output(), ctx.config())? {
                println!("Current configuration ({}):", path.display());
                print!("{}", serde_yaml::to_string(ctx.config())?);
            }
        }
        ConfigAction::Validate => {
            if fs::try_exists(&path).await? {
                let raw = fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?;
                NavisConfig::from_yaml(&raw)
                    .and_then(|config| config.validate())
                    .with_context(|| format!("validating {}", path.display()))?;
                println!("Configuration file {} is valid", path.display());
            } else {
                println!(
                    "No configuration file at {}; defaults are valid",
                    path.display()
                );
            }
            ctx.config()
                .validate()
                .context("environment overrides produce an invalid configuration")?;
        }
        ConfigAction::Path => {
            println!("config:   {}", path.display());
            println!("snapshot: {}", ctx.config().snapshot_path().display());
        }
    }

    Ok(())
}
