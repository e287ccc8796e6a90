//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Taglink - verify and execute prompt-chain tagging tasks
#[derive(Parser, Debug)]
#[command(name = "taglink")]
#[command(about = "Verify and execute prompt-chain tagging tasks", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute and store the checksum of every prompt chain step
    Seal {
        /// Path to the task JSON file
        #[arg(long)]
        task: PathBuf,

        /// Write the sealed task here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Check a task's prompt chain without executing it
    Verify {
        /// Path to the task JSON file
        #[arg(long)]
        task: PathBuf,
    },

    /// Normalize raw source material into a task input
    Normalize {
        /// Path to the raw source JSON file
        #[arg(long)]
        source: PathBuf,

        /// Input kind: conversation or webpage_markdown
        #[arg(long)]
        kind: String,
    },

    /// Execute a task against recorded model responses
    Run {
        /// Path to the task JSON file
        #[arg(long)]
        task: PathBuf,

        /// JSON array of raw model outputs, one per step
        #[arg(long)]
        responses: PathBuf,

        /// Configuration file (defaults to the layered taglink.toml lookup)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}
