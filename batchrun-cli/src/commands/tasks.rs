//! Task inspection commands

use anyhow::Result;
use batchrun_core::domain::task::TaskState;
use batchrun_dispatcher::Dispatcher;
use colored::*;

/// List the job's tasks and their state
pub async fn list_tasks(dispatcher: &Dispatcher) -> Result<()> {
    let job_id = &dispatcher.config().job_id;
    let tasks = dispatcher.list_tasks(job_id).await?;

    if tasks.is_empty() {
        println!("{}", format!("No tasks found in job {}.", job_id).yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} task(s) in job {}:", tasks.len(), job_id).bold()
    );
    println!();
    for task in tasks {
        let state = match task.state {
            TaskState::Pending => task.state.to_string().yellow(),
            TaskState::Running => task.state.to_string().blue(),
            TaskState::Completed => task.state.to_string().green(),
        };
        let node = task
            .node_info
            .map(|info| info.node_id)
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<10} {:<10} {}", task.id.to_string().cyan(), state, node);
    }

    Ok(())
}

/// Print the captured stdout of each task
pub async fn print_outputs(dispatcher: &Dispatcher) -> Result<()> {
    let job_id = &dispatcher.config().job_id;
    let outputs = dispatcher.collect_outputs(job_id).await?;

    for output in outputs {
        println!("{} {}", "Task:".bold(), output.task_id.to_string().cyan());
        println!("{} {}", "Node:".bold(), output.node_id);
        println!("{}", "Standard out:".bold());
        println!("{}", output.stdout);
        println!();
    }

    Ok(())
}
