use super::app::CliArgs;
use super::config::cmd_config;
use super::decide::cmd_decide;
use super::feedback::cmd_feedback;
use super::score::cmd_score;
use super::stats::cmd_stats;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;
use anyhow::Result;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Score(args) => cmd_score(args, ctx).await,
        Commands::Decide(args) => cmd_decide(args, ctx).await,
        Commands::Feedback(args) => cmd_feedback(args, ctx).await,
        Commands::Stats => cmd_stats(ctx).await,
        Commands::Config(args) => cmd_config(args, ctx).await,
    }
}
