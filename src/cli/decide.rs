use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use decision_gate::Decision;
use navis_core_types::{ScoredElement, SessionId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::metrics::{self, MetricsReport};
use crate::page::PageSnapshot;

#[derive(Args, Clone, Debug)]
pub struct DecideArgs {
    /// Page snapshot (JSON) holding the intent and the page elements
    #[arg(short, long, value_name = "FILE")]
    pub page: PathBuf,

    /// Element index the user picked when asked to choose
    #[arg(long, value_name = "INDEX")]
    pub select: Option<usize>,

    /// How executing the chosen element went
    #[arg(long, value_enum)]
    pub outcome: Option<Outcome>,

    /// Confidence threshold for this run only
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Do not persist what was learned
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failure,
}

#[derive(Debug, Serialize)]
struct DecideReport {
    session: SessionId,
    restored: bool,
    decision: Decision,
    acted_on: Option<usize>,
    outcome: Option<Outcome>,
    rewards: Vec<f64>,
    metrics: MetricsReport,
}

pub async fn cmd_decide(args: DecideArgs, ctx: &CliContext) -> Result<()> {
    let page = PageSnapshot::load(&args.page).await?;
    let (shared, restored) = ctx.open_session()?;
    let mut session = shared.lock();

    if let Some(threshold) = args.threshold {
        session.set_threshold(threshold)?;
    }
    let decision = session.evaluate(&page).decision.clone();

    let mut rewards = Vec::new();
    let acted_on = match (&decision, args.select) {
        (Decision::Autonomous { selection, .. }, select) => {
            if select.is_some() {
                warn!("--select ignored: the decision was autonomous");
            }
            Some(selection.candidate.index)
        }
        (Decision::Disambiguation { .. }, Some(index)) => {
            rewards.push(session.select(index)?);
            Some(index)
        }
        (Decision::Disambiguation { .. }, None) => None,
    };

    if let Some(outcome) = args.outcome {
        let index = acted_on
            .ok_or_else(|| anyhow!("nothing to execute; pass --select to answer the request"))?;
        let token = session.begin(index)?;
        debug!(allowed = token.is_allowed(), "Step token issued");
        rewards.push(session.report_outcome(outcome == Outcome::Success, None)?);
    }

    if !args.dry_run {
        session.save(&ctx.snapshot_store())?;
    }

    let report = DecideReport {
        session: session.id().clone(),
        restored,
        decision,
        acted_on,
        outcome: args.outcome,
        rewards,
        metrics: metrics::report(),
    };
    drop(session);

    if print_structured(ctx.output(), &report)? {
        return Ok(());
    }
    print_human(&report);
    Ok(())
}

fn print_human(report: &DecideReport) {
    let decision = &report.decision;
    match decision {
        Decision::Autonomous {
            selection,
            alternatives,
            ..
        } => {
            println!(
                "Acting autonomously (confidence {:.2}, score {:.2} via {})",
                decision.confidence(),
                selection.effective_score(),
                selection.method
            );
            println!("  -> {}", describe(&selection.candidate));
            if !alternatives.is_empty() {
                println!("  Alternatives:");
                for alt in alternatives {
                    println!("     {}", describe(alt));
                }
            }
        }
        Decision::Disambiguation {
            reason,
            top_candidates,
            recommended,
            ..
        } => {
            println!(
                "Asking the user ({}, confidence {:.2})",
                reason,
                decision.confidence()
            );
            if let Some(explanation) = decision.explanation() {
                println!("  {}", explanation);
            }
            for (position, candidate) in top_candidates.iter().enumerate() {
                println!("  {}. {}", position + 1, describe(candidate));
            }
            if let Some(recommended) = recommended {
                println!("  Recommended: #{}", recommended.candidate.index);
            }
        }
    }

    if let Some(index) = report.acted_on {
        if let Some(outcome) = report.outcome {
            println!("Executed #{}: {:?}", index, outcome);
        }
    }
    if !report.rewards.is_empty() {
        let rewards: Vec<String> = report.rewards.iter().map(|r| format!("{:+.2}", r)).collect();
        println!("Rewards recorded: {}", rewards.join(", "));
    }
}

fn describe(candidate: &ScoredElement) -> String {
    format!(
        "[#{}] {}  total={:.3} confidence={:.3}",
        candidate.index,
        candidate.label(),
        candidate.total_score,
        candidate.confidence
    )
}
