//! Task execution handler.

use std::path::Path;
use taglink::{
    ChainExecutor, ReplayExecutor, TaglinkConfig, TaglinkResult, Task, read_json, to_pretty_json,
};

/// Execute a task against recorded responses and print the task result.
#[tracing::instrument(skip_all, fields(task = %task_path.display()))]
pub async fn run_task(
    task_path: &Path,
    responses: &Path,
    config_path: Option<&Path>,
) -> TaglinkResult<()> {
    let config = match config_path {
        Some(path) => TaglinkConfig::from_file(path)?,
        None => TaglinkConfig::load()?,
    };

    let mut task: Task = read_json(task_path)?;
    let replay = ReplayExecutor::from_file(responses)?;
    let executor = ChainExecutor::new(replay).with_config(config.engine());

    let result = executor.execute(&mut task).await;
    let unused = executor.executor().remaining();
    if unused > 0 {
        tracing::warn!(unused, "Recorded responses left unused");
    }

    println!("{}", to_pretty_json(&result)?);
    Ok(())
}
