//! Dispatch workflow
//!
//! Runs one batch end to end:
//! - Upload every input to the shared container and issue read tokens
//! - Ensure the pool and the job exist
//! - Submit one task per input in a single call
//! - Poll until all tasks completed or the timeout elapsed
//! - Read back each task's stdout
//! - Release the acquired resources according to the cleanup policy

use batchrun_client::{AccountKey, BatchClient, StorageClient};
use batchrun_core::domain::artifact::ArtifactRef;
use batchrun_core::domain::job::JobSpec;
use batchrun_core::domain::outcome::CreateOutcome;
use batchrun_core::domain::pool::PoolSpec;
use batchrun_core::domain::task::{CloudTask, TaskId, TaskOutput, TaskSpec};
use batchrun_core::dto::compute::STDOUT_FILE;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::{Config, Credentials};
use crate::error::{ConfigError, DispatchError};
use crate::repository::{ArtifactRepository, ComputeRepository};
use crate::scheduler::CompletionPoller;
use crate::service::lease::{CleanupReport, Lease, ResourceKind};

/// Result of a successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Captured stdout per task, ordered by task id
    pub outputs: Vec<TaskOutput>,
    pub cleanup: CleanupReport,
}

/// Drives one batch of remote executions
pub struct Dispatcher {
    config: Config,
    compute: Arc<dyn ComputeRepository>,
    artifacts: Arc<dyn ArtifactRepository>,
    poller: CompletionPoller,
}

impl Dispatcher {
    /// Creates a dispatcher over the given repositories
    pub fn new(
        config: Config,
        compute: Arc<dyn ComputeRepository>,
        artifacts: Arc<dyn ArtifactRepository>,
    ) -> Self {
        let poller = CompletionPoller::new(Arc::clone(&compute), config.poll_interval);
        Self {
            config,
            compute,
            artifacts,
            poller,
        }
    }

    /// Creates a dispatcher talking to the real services
    ///
    /// Configuration and credentials are validated here, before any remote
    /// call can happen.
    pub fn connect(config: Config, credentials: &Credentials) -> Result<Self, DispatchError> {
        config.validate()?;
        credentials.validate()?;

        let compute = BatchClient::new(
            credentials.batch_account_url.clone(),
            AccountKey::new(
                credentials.batch_account_name.clone(),
                credentials.batch_account_key.clone(),
            ),
        );
        let storage = StorageClient::new(
            credentials.storage_endpoint.clone(),
            AccountKey::new(
                credentials.storage_account_name.clone(),
                credentials.storage_account_key.clone(),
            ),
        );

        Ok(Self::new(config, Arc::new(compute), Arc::new(storage)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =============================================================================
    // Full run
    // =============================================================================

    /// Runs the whole workflow for `paths`
    ///
    /// Every resource is recorded in a [`Lease`] as soon as it has been
    /// ensured. When the run ends, successfully or not, the lease is
    /// released or retained as the cleanup policy dictates.
    pub async fn run(&self, paths: &[PathBuf]) -> Result<RunReport, DispatchError> {
        self.config.validate()?;

        info!(
            "Dispatch start: {} input(s), pool [{}], job [{}], cleanup policy '{}'",
            paths.len(),
            self.config.pool.id,
            self.config.job_id,
            self.config.cleanup_policy
        );

        let mut lease = Lease::new();
        let result = self.execute(paths, &mut lease).await;
        let succeeded = result.is_ok();

        let cleanup = if self.config.cleanup_policy.should_release(succeeded) {
            lease.release(&self.compute, &self.artifacts).await
        } else {
            if !succeeded {
                warn!(
                    "Run failed and cleanup policy is '{}'; acquired resources are kept",
                    self.config.cleanup_policy
                );
            }
            lease.retain()
        };

        match result {
            Ok(outputs) => {
                info!("Dispatch complete: {} output(s) collected", outputs.len());
                Ok(RunReport { outputs, cleanup })
            }
            Err(e) => {
                error!("Dispatch failed: {}", e);
                Err(e)
            }
        }
    }

    async fn execute(
        &self,
        paths: &[PathBuf],
        lease: &mut Lease,
    ) -> Result<Vec<TaskOutput>, DispatchError> {
        let job_id = self.config.job_id.as_str();
        let pool_id = self.config.pool.id.as_str();

        self.ensure_container().await?;
        lease.hold_container(&self.config.container);

        let artifacts = self.upload_files(paths).await?;

        self.ensure_pool(&self.config.pool).await?;
        lease.hold_pool(pool_id);

        self.ensure_job(job_id, pool_id).await?;
        lease.hold_job(job_id);

        self.submit_tasks(job_id, &artifacts).await?;
        self.await_completion(job_id, self.config.completion_timeout)
            .await?;

        self.collect_outputs(job_id).await
    }

    // =============================================================================
    // Inputs
    // =============================================================================

    /// Creates the shared container if it is absent
    pub async fn ensure_container(&self) -> Result<CreateOutcome, DispatchError> {
        let container = &self.config.container;
        info!("Creating container [{}]...", container);
        let outcome = self.artifacts.create_container(container).await?;
        accept_outcome(ResourceKind::Container, container, outcome)
    }

    /// Uploads each file to the shared container
    ///
    /// Returns one read-only reference per file, in input order. Any failure
    /// aborts the whole batch.
    pub async fn upload(&self, paths: &[PathBuf]) -> Result<Vec<ArtifactRef>, DispatchError> {
        self.ensure_container().await?;
        self.upload_files(paths).await
    }

    async fn upload_files(&self, paths: &[PathBuf]) -> Result<Vec<ArtifactRef>, DispatchError> {
        let container = &self.config.container;
        let names = blob_names(paths)?;
        let expires_at = chrono::Duration::from_std(self.config.token_ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| ConfigError::Invalid("token_ttl is out of range".to_string()))?;

        let mut refs = Vec::with_capacity(paths.len());
        for (path, blob_name) in paths.iter().zip(names) {
            info!(
                "Uploading file {} to container [{}]...",
                path.display(),
                container
            );

            let data = tokio::fs::read(path)
                .await
                .map_err(|source| DispatchError::ReadArtifact {
                    path: path.clone(),
                    source,
                })?;

            self.artifacts
                .upload_blob(container, &blob_name, data)
                .await?;
            let token = self
                .artifacts
                .issue_read_token(container, &blob_name, expires_at)
                .await?;

            refs.push(ArtifactRef {
                source_path: path.clone(),
                url: self.artifacts.blob_url(container, &blob_name),
                blob_name,
                token,
                expires_at,
            });
        }

        Ok(refs)
    }

    // =============================================================================
    // Pool and job
    // =============================================================================

    /// Creates the pool unless one with the same id exists
    pub async fn ensure_pool(&self, spec: &PoolSpec) -> Result<CreateOutcome, DispatchError> {
        info!(
            "Creating pool [{}] ({} x {})...",
            spec.id, spec.target_dedicated_nodes, spec.vm_size
        );
        let outcome = self.compute.create_pool(spec).await?;
        accept_outcome(ResourceKind::Pool, &spec.id, outcome)
    }

    /// Creates the job on `pool_id` unless one with the same id exists
    pub async fn ensure_job(
        &self,
        job_id: &str,
        pool_id: &str,
    ) -> Result<CreateOutcome, DispatchError> {
        info!("Creating job [{}]...", job_id);
        let outcome = self
            .compute
            .create_job(&JobSpec::new(job_id, pool_id))
            .await?;
        accept_outcome(ResourceKind::Job, job_id, outcome)
    }

    // =============================================================================
    // Tasks
    // =============================================================================

    /// Builds one task per artifact
    ///
    /// Task `i` is `Task{i}`, runs the command template against the
    /// artifact's file name and downloads exactly that artifact. Expired
    /// references are refused.
    pub fn build_tasks(&self, artifacts: &[ArtifactRef]) -> Result<Vec<TaskSpec>, DispatchError> {
        let now = Utc::now();

        artifacts
            .iter()
            .enumerate()
            .map(|(index, artifact)| {
                if !artifact.is_valid_at(now) {
                    return Err(DispatchError::ExpiredArtifact {
                        blob: artifact.blob_name.clone(),
                        expires_at: artifact.expires_at,
                    });
                }

                Ok(TaskSpec {
                    id: TaskId::for_index(index),
                    command_line: self.config.command_line(&artifact.blob_name),
                    resource_files: vec![artifact.to_resource_file()],
                })
            })
            .collect()
    }

    /// Submits one task per artifact in a single batch-add call
    pub async fn submit_tasks(
        &self,
        job_id: &str,
        artifacts: &[ArtifactRef],
    ) -> Result<Vec<TaskId>, DispatchError> {
        let tasks = self.build_tasks(artifacts)?;
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();

        if tasks.is_empty() {
            warn!("No inputs; nothing to submit to job [{}]", job_id);
            return Ok(ids);
        }

        info!("Adding {} tasks to job [{}]...", tasks.len(), job_id);
        self.compute.add_tasks(job_id, tasks).await?;

        Ok(ids)
    }

    /// Blocks until every task of the job completed or `timeout` elapsed
    pub async fn await_completion(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Result<Vec<CloudTask>, DispatchError> {
        self.poller.wait_all(job_id, timeout).await
    }

    /// Current state of the job's tasks, ordered by task id
    pub async fn list_tasks(&self, job_id: &str) -> Result<Vec<CloudTask>, DispatchError> {
        let mut tasks = self.compute.list_tasks(job_id).await?;
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tasks)
    }

    /// Reads each task's captured stdout, ordered by task id
    pub async fn collect_outputs(&self, job_id: &str) -> Result<Vec<TaskOutput>, DispatchError> {
        let tasks = self.list_tasks(job_id).await?;

        let mut outputs = Vec::with_capacity(tasks.len());
        for task in tasks {
            if !task.state.is_terminal() {
                warn!(
                    "Task {} is {}; its output may be incomplete",
                    task.id, task.state
                );
            }

            let node_id = task
                .node_info
                .map(|info| info.node_id)
                .ok_or_else(|| DispatchError::NoNodeAssigned(task.id.clone()))?;

            debug!("Reading {} of task {} on node {}", STDOUT_FILE, task.id, node_id);
            let stdout = self
                .compute
                .read_task_file(job_id, &task.id, STDOUT_FILE)
                .await?;

            outputs.push(TaskOutput {
                task_id: task.id,
                node_id,
                stdout,
            });
        }

        Ok(outputs)
    }

    // =============================================================================
    // Cleanup
    // =============================================================================

    /// Deletes the job, the pool and the container
    ///
    /// Each deletion is attempted regardless of the others' outcome.
    pub async fn cleanup(&self, job_id: &str, pool_id: &str, container: &str) -> CleanupReport {
        Lease::over(job_id, pool_id, container)
            .release(&self.compute, &self.artifacts)
            .await
    }
}

/// Accepts `Created` and `AlreadyExists`, turns `Rejected` into an error
fn accept_outcome(
    resource: ResourceKind,
    id: &str,
    outcome: CreateOutcome,
) -> Result<CreateOutcome, DispatchError> {
    match outcome {
        CreateOutcome::Created => {
            info!("{} [{}] created", resource, id);
            Ok(outcome)
        }
        CreateOutcome::AlreadyExists => {
            info!(
                "{} [{}] already existed when we tried to create it",
                resource, id
            );
            Ok(outcome)
        }
        CreateOutcome::Rejected {
            status,
            code,
            message,
        } => Err(DispatchError::Rejected {
            resource,
            id: id.to_string(),
            status,
            code,
            message,
        }),
    }
}

/// File name of each path, used as its blob name; names must be unique
fn blob_names(paths: &[PathBuf]) -> Result<Vec<String>, DispatchError> {
    let mut seen = HashSet::new();
    paths
        .iter()
        .map(|path| {
            let name = file_name(path)?;
            if !seen.insert(name.clone()) {
                return Err(DispatchError::DuplicateArtifact(name));
            }
            Ok(name)
        })
        .collect()
}

fn file_name(path: &Path) -> Result<String, DispatchError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| DispatchError::InvalidPath(path.to_path_buf()))
}
