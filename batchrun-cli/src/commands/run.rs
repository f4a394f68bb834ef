//! Run command handler
//!
//! Executes the full dispatch workflow and prints each task's output.

use anyhow::Result;
use batchrun_core::domain::pool::NodeOs;
use batchrun_dispatcher::{CleanupPolicy, CleanupReport, Config, Dispatcher, RunReport};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;

use super::ResourceArgs;

/// Arguments of `batchrun run`
#[derive(Args)]
pub struct RunArgs {
    /// Input files; one task is created per file
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub resources: ResourceArgs,

    /// Number of dedicated nodes in the pool
    #[arg(long)]
    pub nodes: Option<u32>,

    /// VM size of the pool's nodes
    #[arg(long)]
    pub vm_size: Option<String>,

    /// Node operating system (linux or windows); selects image and command
    #[arg(long)]
    pub os: Option<NodeOs>,

    /// Task command line; {file} is replaced by the input's file name
    #[arg(long)]
    pub command: Option<String>,

    /// Seconds to wait for all tasks to complete
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Seconds between task state polls
    #[arg(long)]
    pub poll_secs: Option<u64>,

    /// When to delete the pool, job and container (always, on-success, never)
    #[arg(long)]
    pub cleanup: Option<CleanupPolicy>,

    /// Print the run report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl RunArgs {
    /// Applies the command-line overrides to `config`
    pub fn apply(&self, config: &mut Config) {
        self.resources.apply(config);

        if let Some(os) = self.os {
            config.pool.image = os.default_image();
            config.command_template = os.default_command_template().to_string();
        }
        if let Some(command) = &self.command {
            config.command_template = command.clone();
        }
        if let Some(nodes) = self.nodes {
            config.pool.target_dedicated_nodes = nodes;
        }
        if let Some(vm_size) = &self.vm_size {
            config.pool.vm_size = vm_size.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.completion_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.poll_secs {
            config.poll_interval = Duration::from_secs(secs);
        }
        if let Some(policy) = self.cleanup {
            config.cleanup_policy = policy;
        }
    }
}

/// Run the workflow and print the results
pub async fn handle_run(dispatcher: &Dispatcher, files: &[PathBuf], json: bool) -> Result<()> {
    let report = match dispatcher.run(files).await {
        Ok(report) => report,
        Err(e) if e.is_timeout() && !dispatcher.config().cleanup_policy.should_release(false) => {
            eprintln!(
                "{}",
                "The job was kept; use `batchrun output` to read its tasks later \
                 and `batchrun cleanup` to delete it."
                    .yellow()
            );
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!();
    println!("{}", "Printing task output...".bold());

    for output in &report.outputs {
        println!();
        println!("{} {}", "Task:".bold(), output.task_id.to_string().cyan());
        println!("{} {}", "Node:".bold(), output.node_id);
        println!("{}", "Standard out:".bold());
        println!("{}", output.stdout);
    }

    println!();
    print_cleanup(&report.cleanup);
}

/// Print what happened to the run's resources
pub fn print_cleanup(cleanup: &CleanupReport) {
    for resource in &cleanup.deleted {
        println!("{} {}", "Deleted".green(), resource);
    }
    for resource in &cleanup.retained {
        println!("{} {}", "Kept".yellow(), resource);
    }
    for (resource, reason) in &cleanup.failed {
        println!("{} {}: {}", "Failed to delete".red(), resource, reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        run: RunArgs,
    }

    #[test]
    fn test_run_args_override_config() {
        let cli = TestCli::parse_from([
            "batchrun",
            "a.csv",
            "b.csv",
            "--pool-id",
            "p",
            "--os",
            "windows",
            "--nodes",
            "4",
            "--timeout-secs",
            "600",
            "--cleanup",
            "on-success",
        ]);
        let mut config = Config::default();
        cli.run.apply(&mut config);

        assert_eq!(cli.run.files.len(), 2);
        assert_eq!(config.pool.id, "p");
        assert_eq!(config.pool.target_dedicated_nodes, 4);
        assert_eq!(config.pool.image.offer, "WindowsServer");
        assert_eq!(config.command_line("a.csv"), "cmd /c type a.csv");
        assert_eq!(config.completion_timeout, Duration::from_secs(600));
        assert_eq!(config.cleanup_policy, CleanupPolicy::OnSuccess);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_command_wins_over_os_default() {
        let cli = TestCli::parse_from(["batchrun", "a.csv", "--os", "linux", "--command", "wc -l {file}"]);
        let mut config = Config::default();
        cli.run.apply(&mut config);

        assert_eq!(config.command_line("a.csv"), "wc -l a.csv");
    }

    #[test]
    fn test_run_requires_files() {
        assert!(TestCli::try_parse_from(["batchrun"]).is_err());
    }
}
