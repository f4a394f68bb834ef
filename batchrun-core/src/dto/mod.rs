//! Data Transfer Objects for the remote APIs
//!
//! Request and response envelopes exchanged with the compute-cluster and
//! blob store services. Domain entities travel inside these wrappers.

pub mod compute;
pub mod storage;

use serde::{Deserialize, Serialize};

/// Error body returned by both remote services
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
