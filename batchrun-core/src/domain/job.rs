//! Job domain types

use serde::{Deserialize, Serialize};

/// Job creation request
///
/// A job groups tasks and runs them on a single pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    pub id: String,
    pub pool_info: PoolInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolInfo {
    pub pool_id: String,
}

impl JobSpec {
    pub fn new(id: impl Into<String>, pool_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pool_info: PoolInfo {
                pool_id: pool_id.into(),
            },
        }
    }
}
