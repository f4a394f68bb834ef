//! In-memory fakes of the repositories
//!
//! The fakes record every call so tests can assert on the orchestration
//! contract without a remote service.

use async_trait::async_trait;
use batchrun_client::{ClientError, Result};
use batchrun_core::domain::job::JobSpec;
use batchrun_core::domain::outcome::CreateOutcome;
use batchrun_core::domain::pool::PoolSpec;
use batchrun_core::domain::task::{CloudTask, NodeInfo, TaskId, TaskSpec, TaskState};
use batchrun_core::dto::compute::STDOUT_FILE;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::Duration;

use crate::repository::{ArtifactRepository, ComputeRepository};

pub fn rejected(status: u16, code: &str) -> CreateOutcome {
    CreateOutcome::Rejected {
        status,
        code: code.to_string(),
        message: format!("{} from fake", code),
    }
}

#[derive(Debug, Default)]
pub struct ComputeState {
    pub pool_outcome: Option<CreateOutcome>,
    pub job_outcome: Option<CreateOutcome>,
    /// Tasks report Completed from this poll on; `None` means never
    pub complete_after_polls: Option<usize>,
    pub fail_add_tasks: bool,
    pub fail_delete_pool: bool,
    /// Listed tasks carry no node assignment
    pub unassigned: bool,
    /// Each listing takes this long to answer
    pub list_delay: Option<Duration>,

    pub created_pools: Vec<PoolSpec>,
    pub created_jobs: Vec<JobSpec>,
    pub add_task_calls: usize,
    pub tasks: Vec<TaskSpec>,
    pub polls: usize,
    pub file_reads: Vec<(TaskId, String)>,
    pub deleted_pools: Vec<String>,
    pub deleted_jobs: Vec<String>,
}

/// Fake compute-cluster service
#[derive(Debug, Default)]
pub struct FakeCompute {
    pub state: Mutex<ComputeState>,
}

impl FakeCompute {
    pub fn completing_after(polls: usize) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().complete_after_polls = Some(polls);
        fake
    }

    pub fn never_completing() -> Self {
        Self::default()
    }

    pub fn with_pool_outcome(self, outcome: CreateOutcome) -> Self {
        self.state.lock().unwrap().pool_outcome = Some(outcome);
        self
    }

    pub fn with_job_outcome(self, outcome: CreateOutcome) -> Self {
        self.state.lock().unwrap().job_outcome = Some(outcome);
        self
    }

    /// Pre-populates a job's task list, skipping submission
    pub fn with_tasks(self, tasks: Vec<TaskSpec>) -> Self {
        self.state.lock().unwrap().tasks = tasks;
        self
    }

    pub fn snapshot<T>(&self, f: impl FnOnce(&ComputeState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

#[async_trait]
impl ComputeRepository for FakeCompute {
    async fn create_pool(&self, spec: &PoolSpec) -> Result<CreateOutcome> {
        let mut state = self.state.lock().unwrap();
        state.created_pools.push(spec.clone());
        Ok(state.pool_outcome.clone().unwrap_or(CreateOutcome::Created))
    }

    async fn delete_pool(&self, pool_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.deleted_pools.push(pool_id.to_string());
        if state.fail_delete_pool {
            return Err(ClientError::api_error(500, "pool delete failed"));
        }
        Ok(())
    }

    async fn create_job(&self, spec: &JobSpec) -> Result<CreateOutcome> {
        let mut state = self.state.lock().unwrap();
        state.created_jobs.push(spec.clone());
        Ok(state.job_outcome.clone().unwrap_or(CreateOutcome::Created))
    }

    async fn delete_job(&self, job_id: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .deleted_jobs
            .push(job_id.to_string());
        Ok(())
    }

    async fn add_tasks(&self, _job_id: &str, tasks: Vec<TaskSpec>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.add_task_calls += 1;
        if state.fail_add_tasks {
            return Err(ClientError::api_error(
                400,
                r#"{"code":"InvalidPropertyValue","message":"bad task"}"#,
            ));
        }
        state.tasks.extend(tasks);
        Ok(())
    }

    async fn list_tasks(&self, _job_id: &str) -> Result<Vec<CloudTask>> {
        let delay = self.state.lock().unwrap().list_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock().unwrap();
        state.polls += 1;
        let completed = state
            .complete_after_polls
            .is_some_and(|after| state.polls >= after);

        let unassigned = state.unassigned;
        // Listed newest first so callers cannot rely on submission order
        let tasks = state
            .tasks
            .iter()
            .enumerate()
            .rev()
            .map(|(i, spec)| CloudTask {
                id: spec.id.clone(),
                state: if completed {
                    TaskState::Completed
                } else {
                    TaskState::Running
                },
                command_line: spec.command_line.clone(),
                node_info: (!unassigned).then(|| NodeInfo {
                    node_id: format!("node-{}", i % 2),
                }),
            })
            .collect();
        Ok(tasks)
    }

    async fn read_task_file(
        &self,
        _job_id: &str,
        task_id: &TaskId,
        file_name: &str,
    ) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.file_reads.push((task_id.clone(), file_name.to_string()));
        let spec = state
            .tasks
            .iter()
            .find(|t| &t.id == task_id)
            .ok_or_else(|| ClientError::api_error(404, "no such task"))?;
        if file_name != STDOUT_FILE {
            return Err(ClientError::api_error(404, "no such file"));
        }
        Ok(format!("output of {}", spec.command_line))
    }
}

#[derive(Debug, Default)]
pub struct StoreState {
    pub container_outcome: Option<CreateOutcome>,
    pub fail_upload_of: Option<String>,

    pub created_containers: Vec<String>,
    pub uploads: Vec<(String, String, Vec<u8>)>,
    pub token_requests: Vec<(String, DateTime<Utc>)>,
    pub deleted_containers: Vec<String>,
}

/// Fake blob store
#[derive(Debug, Default)]
pub struct FakeStore {
    pub state: Mutex<StoreState>,
}

impl FakeStore {
    pub fn snapshot<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        f(&self.state.lock().unwrap())
    }
}

#[async_trait]
impl ArtifactRepository for FakeStore {
    async fn create_container(&self, container: &str) -> Result<CreateOutcome> {
        let mut state = self.state.lock().unwrap();
        state.created_containers.push(container.to_string());
        Ok(state
            .container_outcome
            .clone()
            .unwrap_or(CreateOutcome::Created))
    }

    async fn delete_container(&self, container: &str) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .deleted_containers
            .push(container.to_string());
        Ok(())
    }

    async fn upload_blob(&self, container: &str, blob: &str, data: Vec<u8>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_upload_of.as_deref() == Some(blob) {
            return Err(ClientError::api_error(403, "AuthorizationFailure"));
        }
        state
            .uploads
            .push((container.to_string(), blob.to_string(), data));
        Ok(())
    }

    async fn issue_read_token(
        &self,
        _container: &str,
        blob: &str,
        expiry: DateTime<Utc>,
    ) -> Result<String> {
        self.state
            .lock()
            .unwrap()
            .token_requests
            .push((blob.to_string(), expiry));
        Ok(format!("sp=r&sig={}", blob))
    }

    fn blob_url(&self, container: &str, blob: &str) -> String {
        format!("https://store.test/{}/{}", container, blob)
    }
}
