//! Blob store API client

use batchrun_core::domain::outcome::CreateOutcome;
use batchrun_core::dto::storage::{CONTAINER_EXISTS, TokenRequest, TokenResponse};
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::debug;

use crate::error::Result;
use crate::response::{handle_create_response, handle_empty_response, handle_response};
use crate::{AccountKey, normalize_base_url};

/// HTTP client for the blob store API
#[derive(Debug, Clone)]
pub struct StorageClient {
    /// Blob endpoint of the storage account
    base_url: String,
    account: AccountKey,
    client: Client,
}

impl StorageClient {
    pub fn new(base_url: impl Into<String>, account: AccountKey) -> Self {
        Self::with_client(base_url, account, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, account: AccountKey, client: Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            account,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public URL of a blob, without any access token
    pub fn blob_url(&self, container: &str, blob: &str) -> String {
        format!("{}/{}/{}", self.base_url, container, blob)
    }

    /// Create a container; an existing one answers `AlreadyExists`
    pub async fn create_container(&self, container: &str) -> Result<CreateOutcome> {
        let url = format!("{}/{}", self.base_url, container);
        let response = self
            .account
            .apply(self.client.put(&url))
            .query(&[("restype", "container")])
            .send()
            .await?;

        handle_create_response(response, CONTAINER_EXISTS).await
    }

    /// Delete a container and every blob in it
    pub async fn delete_container(&self, container: &str) -> Result<()> {
        let url = format!("{}/{}", self.base_url, container);
        let response = self
            .account
            .apply(self.client.delete(&url))
            .query(&[("restype", "container")])
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Upload a blob, replacing any blob with the same name
    pub async fn upload_blob(&self, container: &str, blob: &str, data: Vec<u8>) -> Result<()> {
        let url = self.blob_url(container, blob);
        debug!("PUT {} ({} bytes)", url, data.len());
        let response = self
            .account
            .apply(self.client.put(&url))
            .header("x-ms-blob-type", "BlockBlob")
            .body(data)
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Issue a read-only access token for a blob, valid until `expiry`
    pub async fn issue_read_token(
        &self,
        container: &str,
        blob: &str,
        expiry: DateTime<Utc>,
    ) -> Result<String> {
        let url = self.blob_url(container, blob);
        let response = self
            .account
            .apply(self.client.post(&url))
            .query(&[("comp", "token")])
            .json(&TokenRequest::read_only(expiry))
            .send()
            .await?;

        let token: TokenResponse = handle_response(response).await?;
        Ok(token.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blob_url() {
        let client = StorageClient::new("https://acct.blob.example/", AccountKey::new("acct", "k"));
        assert_eq!(
            client.blob_url("input", "stock0.csv"),
            "https://acct.blob.example/input/stock0.csv"
        );
    }
}
