//! Compute-cluster API client

use batchrun_core::domain::job::JobSpec;
use batchrun_core::domain::outcome::CreateOutcome;
use batchrun_core::domain::pool::PoolSpec;
use batchrun_core::domain::task::{CloudTask, TaskId, TaskSpec};
use batchrun_core::dto::compute::{AddTaskCollection, JOB_EXISTS, POOL_EXISTS, TaskList};
use reqwest::Client;
use tracing::debug;

use crate::error::Result;
use crate::response::{
    handle_create_response, handle_empty_response, handle_response, handle_text_response,
};
use crate::{AccountKey, normalize_base_url};

/// HTTP client for the compute-cluster API
///
/// Methods are grouped by resource:
/// - Pools (create, delete)
/// - Jobs (create, delete)
/// - Tasks (batch add, list, read output files)
#[derive(Debug, Clone)]
pub struct BatchClient {
    /// Base URL of the batch account (e.g., "https://acct.region.batch.example")
    base_url: String,
    account: AccountKey,
    /// HTTP client instance
    client: Client,
}

impl BatchClient {
    /// Create a new compute client
    ///
    /// # Arguments
    /// * `base_url` - The batch account URL
    /// * `account` - Account name and key
    pub fn new(base_url: impl Into<String>, account: AccountKey) -> Self {
        Self::with_client(base_url, account, Client::new())
    }

    /// Create a new compute client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, account: AccountKey, client: Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            account,
            client,
        }
    }

    /// Get the base URL of the batch account
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Pools
    // =============================================================================

    /// Create a pool
    ///
    /// A pool with the same id answers `AlreadyExists` instead of failing.
    pub async fn create_pool(&self, spec: &PoolSpec) -> Result<CreateOutcome> {
        let url = format!("{}/pools", self.base_url);
        debug!("POST {} (pool {})", url, spec.id);
        let response = self
            .account
            .apply(self.client.post(&url))
            .json(spec)
            .send()
            .await?;

        handle_create_response(response, POOL_EXISTS).await
    }

    /// Delete a pool and its nodes
    pub async fn delete_pool(&self, pool_id: &str) -> Result<()> {
        let url = format!("{}/pools/{}", self.base_url, pool_id);
        let response = self.account.apply(self.client.delete(&url)).send().await?;

        handle_empty_response(response).await
    }

    // =============================================================================
    // Jobs
    // =============================================================================

    /// Create a job bound to a pool
    ///
    /// A job with the same id answers `AlreadyExists` instead of failing.
    pub async fn create_job(&self, spec: &JobSpec) -> Result<CreateOutcome> {
        let url = format!("{}/jobs", self.base_url);
        debug!("POST {} (job {})", url, spec.id);
        let response = self
            .account
            .apply(self.client.post(&url))
            .json(spec)
            .send()
            .await?;

        handle_create_response(response, JOB_EXISTS).await
    }

    /// Delete a job and all of its tasks
    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.account.apply(self.client.delete(&url)).send().await?;

        handle_empty_response(response).await
    }

    // =============================================================================
    // Tasks
    // =============================================================================

    /// Submit tasks to a job in a single call
    pub async fn add_tasks(&self, job_id: &str, tasks: Vec<TaskSpec>) -> Result<()> {
        let url = format!("{}/jobs/{}/addtaskcollection", self.base_url, job_id);
        debug!("POST {} ({} task(s))", url, tasks.len());
        let response = self
            .account
            .apply(self.client.post(&url))
            .json(&AddTaskCollection { value: tasks })
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// List the tasks of a job with their current state
    pub async fn list_tasks(&self, job_id: &str) -> Result<Vec<CloudTask>> {
        let url = format!("{}/jobs/{}/tasks", self.base_url, job_id);
        let response = self.account.apply(self.client.get(&url)).send().await?;

        let list: TaskList = handle_response(response).await?;
        Ok(list.value)
    }

    /// Read a file from a task's working directory
    ///
    /// # Arguments
    /// * `job_id` - The job the task belongs to
    /// * `task_id` - The task
    /// * `file_name` - File name, e.g. [`STDOUT_FILE`](batchrun_core::dto::compute::STDOUT_FILE)
    pub async fn get_task_file(
        &self,
        job_id: &str,
        task_id: &TaskId,
        file_name: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/jobs/{}/tasks/{}/files/{}",
            self.base_url, job_id, task_id, file_name
        );
        let response = self.account.apply(self.client.get(&url)).send().await?;

        handle_text_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = BatchClient::new("https://batch.example/", AccountKey::new("a", "k"));
        assert_eq!(client.base_url(), "https://batch.example");
    }

    #[test]
    fn test_client_with_custom_client() {
        let client =
            BatchClient::with_client("https://batch.example", AccountKey::new("a", "k"), Client::new());
        assert_eq!(client.base_url(), "https://batch.example");
    }
}
