//! CLI entry point for yt-obsidian.

use std::process::ExitCode;

use clap::Parser;

mod app;
mod cli;

use cli::Cli;

/// Process outcome, mapped to the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProcessExit {
    /// Every item succeeded (or there was nothing to do).
    Success,
    /// Some items failed, some succeeded.
    Partial,
    /// Nothing succeeded, or the run was stopped.
    Failure,
}

impl ProcessExit {
    pub(crate) fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Partial => 1,
            Self::Failure => 2,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();

    match app::runtime::run(cli).await {
        Ok(outcome) => ExitCode::from(outcome.code()),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::from(ProcessExit::Failure.code())
        }
    }
}
