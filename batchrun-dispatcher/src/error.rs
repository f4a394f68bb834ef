//! Error types for the dispatcher

use batchrun_client::ClientError;
use batchrun_core::domain::task::TaskId;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::service::ResourceKind;

/// Configuration problems, detected before any remote call
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Invalid(String),
}

/// Errors that abort a dispatch run
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The service refused to create a resource for a reason other than
    /// "already exists"
    #[error("{resource} '{id}' could not be created (status {status}, code '{code}'): {message}")]
    Rejected {
        resource: ResourceKind,
        id: String,
        status: u16,
        code: String,
        message: String,
    },

    #[error(
        "Timed out after {timeout:?} waiting for job '{job_id}' ({} task(s) not completed)",
        pending.map_or_else(|| "unknown number of".to_string(), |n| n.to_string())
    )]
    Timeout {
        job_id: String,
        timeout: Duration,
        /// Tasks not yet completed at the last finished poll; `None` when
        /// no poll finished before the deadline
        pending: Option<usize>,
    },

    #[error("Failed to read artifact {}: {source}", path.display())]
    ReadArtifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Access token for artifact '{blob}' expired at {expires_at}")]
    ExpiredArtifact {
        blob: String,
        expires_at: DateTime<Utc>,
    },

    #[error("Task {0} has no compute node assignment")]
    NoNodeAssigned(TaskId),

    #[error("Two inputs share the file name '{0}'")]
    DuplicateArtifact(String),

    #[error("Path {} has no file name", .0.display())]
    InvalidPath(PathBuf),
}

impl DispatchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DispatchError::Timeout { .. })
    }
}
