//! Prompt chain sealing and verification handlers.

use std::path::Path;
use taglink::{Task, TaglinkResult, compute_crc, read_json, seal, to_pretty_json, verify, write_json};

/// Seal a task's prompt chain and write the result to `out` or stdout.
#[tracing::instrument(skip_all, fields(task = %task_path.display()))]
pub fn seal_task(task_path: &Path, out: Option<&Path>) -> TaglinkResult<()> {
    let mut task: Task = read_json(task_path)?;
    task.prompt_chain = seal(task.prompt_chain);
    tracing::info!(steps = task.prompt_chain.len(), "Prompt chain sealed");

    match out {
        Some(path) => write_json(path, &task),
        None => {
            println!("{}", to_pretty_json(&task)?);
            Ok(())
        }
    }
}

/// Verify a task's prompt chain, printing each step's stored and computed
/// checksum.
#[tracing::instrument(skip_all, fields(task = %task_path.display()))]
pub fn verify_task(task_path: &Path) -> TaglinkResult<()> {
    let task: Task = read_json(task_path)?;

    let steps: Vec<serde_json::Value> = task
        .prompt_chain
        .iter()
        .map(|step| {
            serde_json::json!({
                "step": step.step(),
                "id": step.id(),
                "crc": step.crc(),
                "computed": compute_crc(step),
            })
        })
        .collect();
    println!("{}", to_pretty_json(&steps)?);

    verify(&task.prompt_chain)?;
    tracing::info!(guid = %task.guid(), "Prompt chain verified");
    Ok(())
}
