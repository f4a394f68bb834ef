//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod cleanup;
mod run;
mod tasks;

pub use run::RunArgs;

use anyhow::Result;
use batchrun_dispatcher::{Config, Credentials, Dispatcher};
use clap::{Args, Subcommand};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Upload files, run one task per file and print each task's output
    Run(RunArgs),
    /// List the tasks of a job and their state
    Tasks {
        #[command(flatten)]
        target: JobArg,
    },
    /// Print the captured stdout of every task of a job
    Output {
        #[command(flatten)]
        target: JobArg,
    },
    /// Delete the job, pool and container left behind by a run
    Cleanup {
        #[command(flatten)]
        resources: ResourceArgs,
    },
}

/// Job selection shared by the read-only commands
#[derive(Args)]
pub struct JobArg {
    /// Job id (default: JOB_ID or netcoreconf-job)
    #[arg(long)]
    pub job_id: Option<String>,
}

/// Remote resource ids, overriding the configured defaults
#[derive(Args)]
pub struct ResourceArgs {
    /// Pool id (default: POOL_ID or netcoreconf-pool)
    #[arg(long)]
    pub pool_id: Option<String>,

    /// Job id (default: JOB_ID or netcoreconf-job)
    #[arg(long)]
    pub job_id: Option<String>,

    /// Blob container for the inputs (default: CONTAINER or input)
    #[arg(long)]
    pub container: Option<String>,
}

impl ResourceArgs {
    /// Applies the overrides to `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(pool_id) = &self.pool_id {
            config.pool.id = pool_id.clone();
        }
        if let Some(job_id) = &self.job_id {
            config.job_id = job_id.clone();
        }
        if let Some(container) = &self.container {
            config.container = container.clone();
        }
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(
    command: Commands,
    mut config: Config,
    credentials: &Credentials,
) -> Result<()> {
    match command {
        Commands::Run(args) => {
            args.apply(&mut config);
            let dispatcher = Dispatcher::connect(config, credentials)?;
            run::handle_run(&dispatcher, &args.files, args.json).await
        }
        Commands::Tasks { target } => {
            if let Some(job_id) = target.job_id {
                config.job_id = job_id;
            }
            let dispatcher = Dispatcher::connect(config, credentials)?;
            tasks::list_tasks(&dispatcher).await
        }
        Commands::Output { target } => {
            if let Some(job_id) = target.job_id {
                config.job_id = job_id;
            }
            let dispatcher = Dispatcher::connect(config, credentials)?;
            tasks::print_outputs(&dispatcher).await
        }
        Commands::Cleanup { resources } => {
            resources.apply(&mut config);
            let dispatcher = Dispatcher::connect(config, credentials)?;
            cleanup::handle_cleanup(&dispatcher).await
        }
    }
}
