//! Blob store API DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error code the blob store uses for a duplicate container
pub const CONTAINER_EXISTS: &str = "ContainerAlreadyExists";

/// Request for a time-bounded access token on a blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    /// Permission letters, `r` for read-only
    pub permissions: String,
    pub expiry: DateTime<Utc>,
}

impl TokenRequest {
    pub fn read_only(expiry: DateTime<Utc>) -> Self {
        Self {
            permissions: "r".to_string(),
            expiry,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
