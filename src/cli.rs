//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Turn YouTube videos, playlists and channels into summarized Obsidian notes.
///
/// Configuration (API keys, AI endpoint, model, retry policy) is read from the
/// environment or a `.env` file in the working directory.
#[derive(Parser, Debug)]
#[command(name = "yt-obsidian")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve each input and write one note per video
    Process(ProcessArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProcessArgs {
    /// YouTube URLs, video/playlist/channel IDs or @handles
    #[arg(required = true, value_name = "URL_OR_ID")]
    pub inputs: Vec<String>,

    /// Directory notes are written to (default: OBSIDIAN_VAULT_PATH, else .)
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Replace notes that already exist instead of skipping them
    #[arg(long)]
    pub overwrite: bool,

    /// Playlists to walk per channel (0 = all)
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub max_depth: usize,

    /// Videos to take from each playlist (0 = all)
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub limit: usize,

    /// Resolve inputs and print the plan without fetching or writing anything
    #[arg(long)]
    pub dry_run: bool,
}
