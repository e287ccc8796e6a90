//! Taglink CLI binary.
//!
//! This binary provides command-line access to taglink's functionality:
//! - Seal and verify prompt chains
//! - Normalize raw source material into task inputs
//! - Execute tasks offline against recorded model responses

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, normalize_source, run_task, seal_task, verify_task};

    // Parse command-line arguments
    let cli = Cli::parse();

    taglink::telemetry::init_telemetry(cli.verbose, cli.json_logs)?;

    // Execute the requested command
    match cli.command {
        Commands::Seal { task, out } => seal_task(&task, out.as_deref())?,
        Commands::Verify { task } => verify_task(&task)?,
        Commands::Normalize { source, kind } => normalize_source(&source, &kind)?,
        Commands::Run {
            task,
            responses,
            config,
        } => run_task(&task, &responses, config.as_deref()).await?,
    }

    Ok(())
}
