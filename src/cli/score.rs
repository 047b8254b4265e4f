use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use element_scorer::ElementScorer;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::page::PageSnapshot;

#[derive(Args, Clone, Debug)]
pub struct ScoreArgs {
    /// Page snapshot (JSON) holding the intent and the page elements
    #[arg(short, long, value_name = "FILE")]
    pub page: PathBuf,

    /// Only show the best N elements
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print the per-feature breakdown of every element
    #[arg(long)]
    pub explain: bool,
}

pub async fn cmd_score(args: ScoreArgs, ctx: &CliContext) -> Result<()> {
    let page = PageSnapshot::load(&args.page).await?;
    let (shared, _) = ctx.open_session()?;
    let history = shared.lock().history().clone();
    let scorer = ElementScorer::with_weights(ctx.config().scoring)?;
    let mut ranked = scorer.score(&page.elements, &page.intent, Some(&history));
    if let Some(limit) = args.limit {
        ranked.truncate(limit);
    }

    if print_structured(ctx.output(), &ranked)? {
        return Ok(());
    }

    println!(
        "Ranked {} of {} element(s) for \"{}\" ({})",
        ranked.len(),
        page.elements.len(),
        page.intent.goal,
        page.intent.action_type
    );
    for candidate in &ranked {
        println!(
            "{:>3}. [#{}] {}  total={:.3} confidence={:.3}",
            candidate.rank,
            candidate.index,
            candidate.label(),
            candidate.total_score,
            candidate.confidence
        );
        if args.explain {
            for line in scorer.explain_score(candidate).lines() {
                println!("       {}", line);
            }
        }
    }
    Ok(())
}
