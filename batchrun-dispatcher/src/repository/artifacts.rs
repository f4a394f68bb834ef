//! Artifact repository
//!
//! Blob store operations used to stage task inputs.

use async_trait::async_trait;
use batchrun_client::{Result, StorageClient};
use batchrun_core::domain::outcome::CreateOutcome;
use chrono::{DateTime, Utc};

/// Repository trait for the blob store
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    /// Creates a container, answering `AlreadyExists` if it is present
    async fn create_container(&self, container: &str) -> Result<CreateOutcome>;

    async fn delete_container(&self, container: &str) -> Result<()>;

    async fn upload_blob(&self, container: &str, blob: &str, data: Vec<u8>) -> Result<()>;

    /// Issues a read-only token for one blob, valid until `expiry`
    async fn issue_read_token(
        &self,
        container: &str,
        blob: &str,
        expiry: DateTime<Utc>,
    ) -> Result<String>;

    /// URL of a blob without any token
    fn blob_url(&self, container: &str, blob: &str) -> String;
}

#[async_trait]
impl ArtifactRepository for StorageClient {
    async fn create_container(&self, container: &str) -> Result<CreateOutcome> {
        StorageClient::create_container(self, container).await
    }

    async fn delete_container(&self, container: &str) -> Result<()> {
        StorageClient::delete_container(self, container).await
    }

    async fn upload_blob(&self, container: &str, blob: &str, data: Vec<u8>) -> Result<()> {
        StorageClient::upload_blob(self, container, blob, data).await
    }

    async fn issue_read_token(
        &self,
        container: &str,
        blob: &str,
        expiry: DateTime<Utc>,
    ) -> Result<String> {
        StorageClient::issue_read_token(self, container, blob, expiry).await
    }

    fn blob_url(&self, container: &str, blob: &str) -> String {
        StorageClient::blob_url(self, container, blob)
    }
}
