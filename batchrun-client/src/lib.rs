//! Batchrun HTTP Clients
//!
//! Type-safe HTTP clients for the two remote services a dispatch run talks
//! to:
//! - [`BatchClient`]: the compute-cluster API (pools, jobs, tasks, task files)
//! - [`StorageClient`]: the blob store API (containers, blobs, access tokens)
//!
//! Both authenticate with an account name and key.
//!
//! # Example
//!
//! ```no_run
//! use batchrun_client::{AccountKey, BatchClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), batchrun_client::ClientError> {
//!     let client = BatchClient::new(
//!         "https://mybatch.westeurope.batch.example",
//!         AccountKey::new("mybatch", "secret"),
//!     );
//!
//!     for task in client.list_tasks("netcoreconf-job").await? {
//!         println!("{} {}", task.id, task.state);
//!     }
//!     Ok(())
//! }
//! ```

mod batch;
pub mod error;
mod response;
mod storage;

// Re-export commonly used types
pub use batch::BatchClient;
pub use error::{ClientError, Result};
pub use response::classify_create;
pub use storage::StorageClient;

/// Account name and shared key used to authenticate against a service
#[derive(Clone)]
pub struct AccountKey {
    pub name: String,
    key: String,
}

impl AccountKey {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
        }
    }

    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(&self.name, Some(&self.key))
    }
}

impl std::fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountKey")
            .field("name", &self.name)
            .field("key", &"<redacted>")
            .finish()
    }
}

fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_key_debug_redacts_key() {
        let key = AccountKey::new("acct", "hunter2");
        let debug = format!("{:?}", key);
        assert!(debug.contains("acct"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:8080/"), "http://localhost:8080");
        assert_eq!(normalize_base_url("http://localhost:8080"), "http://localhost:8080");
    }
}
