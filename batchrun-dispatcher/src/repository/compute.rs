//! Compute repository
//!
//! Pool, job and task operations against the compute-cluster API:
//! - Idempotent pool and job creation
//! - Batch task submission
//! - Task state listing
//! - Reading task output files
//! - Pool and job deletion

use async_trait::async_trait;
use batchrun_client::{BatchClient, Result};
use batchrun_core::domain::job::JobSpec;
use batchrun_core::domain::outcome::CreateOutcome;
use batchrun_core::domain::pool::PoolSpec;
use batchrun_core::domain::task::{CloudTask, TaskId, TaskSpec};

/// Repository trait for compute-cluster operations
#[async_trait]
pub trait ComputeRepository: Send + Sync {
    /// Creates a pool, answering `AlreadyExists` for a duplicate id
    async fn create_pool(&self, spec: &PoolSpec) -> Result<CreateOutcome>;

    async fn delete_pool(&self, pool_id: &str) -> Result<()>;

    /// Creates a job, answering `AlreadyExists` for a duplicate id
    async fn create_job(&self, spec: &JobSpec) -> Result<CreateOutcome>;

    async fn delete_job(&self, job_id: &str) -> Result<()>;

    /// Submits all tasks in a single call
    async fn add_tasks(&self, job_id: &str, tasks: Vec<TaskSpec>) -> Result<()>;

    /// Lists the job's tasks with their current state
    async fn list_tasks(&self, job_id: &str) -> Result<Vec<CloudTask>>;

    /// Reads a file from a task's working directory on its node
    async fn read_task_file(&self, job_id: &str, task_id: &TaskId, file_name: &str)
    -> Result<String>;
}

#[async_trait]
impl ComputeRepository for BatchClient {
    async fn create_pool(&self, spec: &PoolSpec) -> Result<CreateOutcome> {
        BatchClient::create_pool(self, spec).await
    }

    async fn delete_pool(&self, pool_id: &str) -> Result<()> {
        BatchClient::delete_pool(self, pool_id).await
    }

    async fn create_job(&self, spec: &JobSpec) -> Result<CreateOutcome> {
        BatchClient::create_job(self, spec).await
    }

    async fn delete_job(&self, job_id: &str) -> Result<()> {
        BatchClient::delete_job(self, job_id).await
    }

    async fn add_tasks(&self, job_id: &str, tasks: Vec<TaskSpec>) -> Result<()> {
        BatchClient::add_tasks(self, job_id, tasks).await
    }

    async fn list_tasks(&self, job_id: &str) -> Result<Vec<CloudTask>> {
        BatchClient::list_tasks(self, job_id).await
    }

    async fn read_task_file(
        &self,
        job_id: &str,
        task_id: &TaskId,
        file_name: &str,
    ) -> Result<String> {
        self.get_task_file(job_id, task_id, file_name).await
    }
}
