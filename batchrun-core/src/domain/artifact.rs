//! Artifact references
//!
//! An artifact is a local input file uploaded to the blob store. The
//! reference carries a read-only token that expires after a fixed window,
//! so it must outlive the task that consumes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::task::ResourceFile;

/// Uploaded input file plus its time-bounded read access
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Local file that was uploaded
    pub source_path: PathBuf,
    /// Blob name inside the container; also the file name on the node
    pub blob_name: String,
    /// Blob URL without the token
    pub url: String,
    /// Read-only access token (query string, no leading `?`)
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl ArtifactRef {
    /// URL the node can download the blob from
    pub fn sas_url(&self) -> String {
        if self.token.is_empty() {
            self.url.clone()
        } else {
            format!("{}?{}", self.url, self.token.trim_start_matches('?'))
        }
    }

    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        at < self.expires_at
    }

    pub fn to_resource_file(&self) -> ResourceFile {
        ResourceFile {
            http_url: self.sas_url(),
            file_path: self.blob_name.clone(),
        }
    }
}
