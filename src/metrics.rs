//! Process-wide decision counters

use std::sync::atomic::{AtomicU64, Ordering};

use decision_gate::{Decision, DecisionReason};
use learning_agent::FeedbackKind;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Default)]
struct Counters {
    autonomous: AtomicU64,
    disambiguation: AtomicU64,
    no_candidates: AtomicU64,
    user_selections: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    feedback: AtomicU64,
    corrections: AtomicU64,
}

static COUNTERS: Lazy<Counters> = Lazy::new(Counters::default);

fn increment(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub fn record_decision(decision: &Decision) {
    match decision.reason() {
        DecisionReason::HighConfidence => increment(&COUNTERS.autonomous),
        DecisionReason::LowConfidence => increment(&COUNTERS.disambiguation),
        DecisionReason::NoCandidates => {
            increment(&COUNTERS.disambiguation);
            increment(&COUNTERS.no_candidates);
        }
    }
}

pub fn record_user_selection() {
    increment(&COUNTERS.user_selections);
}

pub fn record_outcome(success: bool) {
    if success {
        increment(&COUNTERS.successes);
    } else {
        increment(&COUNTERS.failures);
    }
}

pub fn record_feedback(kind: FeedbackKind) {
    increment(&COUNTERS.feedback);
    if matches!(kind, FeedbackKind::WrongAction | FeedbackKind::BetterAlternative) {
        increment(&COUNTERS.corrections);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DecisionMetricsSnapshot {
    pub autonomous: u64,
    pub disambiguation: u64,
    pub no_candidates: u64,
    pub user_selections: u64,
    pub successes: u64,
    pub failures: u64,
    pub feedback: u64,
    pub corrections: u64,
}

impl DecisionMetricsSnapshot {
    /// Share of decisions taken without asking; 0 before any decision.
    pub fn autonomy_rate(&self) -> f64 {
        let total = self.autonomous + self.disambiguation;
        if total == 0 {
            0.0
        } else {
            self.autonomous as f64 / total as f64
        }
    }
}

pub fn snapshot() -> DecisionMetricsSnapshot {
    DecisionMetricsSnapshot {
        autonomous: COUNTERS.autonomous.load(Ordering::Relaxed),
        disambiguation: COUNTERS.disambiguation.load(Ordering::Relaxed),
        no_candidates: COUNTERS.no_candidates.load(Ordering::Relaxed),
        user_selections: COUNTERS.user_selections.load(Ordering::Relaxed),
        successes: COUNTERS.successes.load(Ordering::Relaxed),
        failures: COUNTERS.failures.load(Ordering::Relaxed),
        feedback: COUNTERS.feedback.load(Ordering::Relaxed),
        corrections: COUNTERS.corrections.load(Ordering::Relaxed),
    }
}

/// Counters plus the derived autonomy rate, as reported by the CLI.
#[derive(Clone, Debug, Serialize)]
pub struct MetricsReport {
    #[serde(flatten)]
    pub counters: DecisionMetricsSnapshot,
    pub autonomy_rate: f64,
}

pub fn report() -> MetricsReport {
    let counters = snapshot();
    MetricsReport {
        autonomy_rate: counters.autonomy_rate(),
        counters,
    }
}
