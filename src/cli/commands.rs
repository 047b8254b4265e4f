use clap::Subcommand;

use super::config::ConfigArgs;
use super::decide::DecideArgs;
use super::feedback::FeedbackArgs;
use super::score::ScoreArgs;

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Score and rank the elements of a page snapshot
    Score(ScoreArgs),

    /// Decide whether to act on a page snapshot or ask the user
    Decide(DecideArgs),

    /// Record feedback about an element of a page snapshot
    Feedback(FeedbackArgs),

    /// Show what the agent has learned so far
    Stats,

    /// Inspect Navis configuration
    Config(ConfigArgs),
}
