use std::path::PathBuf;

use anyhow::Result;
use decision_gate::GateStatistics;
use serde::Serialize;

use crate::cli::context::CliContext;
use crate::cli::output::print_structured;
use crate::metrics::{self, MetricsReport};

#[derive(Debug, Serialize)]
struct StatsReport {
    snapshot: PathBuf,
    restored: bool,
    statistics: GateStatistics,
    /// Counters of this process only
    metrics: MetricsReport,
}

pub async fn cmd_stats(ctx: &CliContext) -> Result<()> {
    let (shared, restored) = ctx.open_session()?;
    let statistics = shared.lock().gate().statistics();
    let report = StatsReport {
        snapshot: ctx.config().snapshot_path(),
        restored,
        statistics,
        metrics: metrics::report(),
    };

    if print_structured(ctx.output(), &report)? {
        return Ok(());
    }

    let stats = &report.statistics;
    let agent = &stats.agent;
    println!("Navis agent statistics");
    println!("  Snapshot:             {}", report.snapshot.display());
    if !report.restored {
        println!("  (no saved state, showing defaults)");
    }
    println!("  Confidence threshold: {:.2}", stats.confidence_threshold);
    println!("  Minimum score:        {:.2}", stats.min_score);
    println!("  Exploration rate:     {:.4}", agent.exploration_rate);
    println!(
        "  Recorded outcomes:    {} ({} batch updates)",
        agent.total_recorded, agent.batch_updates
    );
    println!("  Value table entries:  {}", agent.value_table_size);
    println!("  Mean value estimate:  {:.4}", agent.mean_value_estimate);
    println!("  Feature weights:");
    for (feature, weight) in &agent.feature_weights {
        println!("    {:<22} {:.4}", feature.name(), weight);
    }
    if !agent.success_rates.is_empty() {
        println!("  Success rates:");
        for (action, rate) in &agent.success_rates {
            println!("    {:>5.1}%  {}", rate * 100.0, action);
        }
    }
    let counters = &report.metrics.counters;
    println!(
        "  This process:         {} autonomous, {} asked, {} outcomes, {} feedback (autonomy {:.0}%)",
        counters.autonomous,
        counters.disambiguation,
        counters.successes + counters.failures,
        counters.feedback,
        report.metrics.autonomy_rate * 100.0
    );
    Ok(())
}
