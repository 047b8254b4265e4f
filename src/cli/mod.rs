pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod decide;
pub mod dispatch;
pub mod feedback;
pub mod output;
pub mod runtime;
pub mod score;
pub mod stats;

pub use app::run;
pub use context::CliContext;
pub use output::OutputFormat;
