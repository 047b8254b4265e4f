use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use learning_agent::{AgentError, FeedbackKind};
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::page::PageSnapshot;

#[derive(Args, Clone, Debug)]
pub struct FeedbackArgs {
    /// Page snapshot (JSON) the feedback refers to
    #[arg(short, long, value_name = "FILE")]
    pub page: PathBuf,

    /// Index of the element the feedback is about
    #[arg(long, value_name = "INDEX")]
    pub element: usize,

    /// correct_action, wrong_action, better_alternative, user_selection or user_correction
    #[arg(long, value_parser = parse_feedback_kind)]
    pub kind: FeedbackKind,

    /// Index of the element that should have been chosen instead
    #[arg(long, value_name = "INDEX")]
    pub alternative: Option<usize>,

    /// Do not persist what was learned
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_feedback_kind(raw: &str) -> std::result::Result<FeedbackKind, String> {
    raw.parse().map_err(|err: AgentError| err.to_string())
}

#[derive(Debug, Serialize)]
struct FeedbackReport {
    element: usize,
    kind: FeedbackKind,
    alternative: Option<usize>,
    reward: f64,
}

pub async fn cmd_feedback(args: FeedbackArgs, ctx: &CliContext) -> Result<()> {
    if args.kind == FeedbackKind::BetterAlternative && args.alternative.is_none() {
        bail!("better_alternative feedback needs --alternative");
    }
    let page = PageSnapshot::load(&args.page).await?;
    let (shared, _) = ctx.open_session()?;

    let reward = {
        let mut session = shared.lock();
        session.evaluate(&page);
        let reward = session.feedback(args.element, args.kind, args.alternative)?;
        if !args.dry_run {
            session.save(&ctx.snapshot_store())?;
        }
        reward
    };

    let report = FeedbackReport {
        element: args.element,
        kind: args.kind,
        alternative: args.alternative,
        reward,
    };
    if print_structured(ctx.output(), &report)? {
        return Ok(());
    }
    println!(
        "Recorded {} for #{} (reward {:+.2})",
        report.kind, report.element, report.reward
    );
    Ok(())
}
