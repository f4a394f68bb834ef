//! Compute-cluster API DTOs

use serde::{Deserialize, Serialize};

use crate::domain::task::{CloudTask, TaskSpec};

/// Error code the compute service uses for a duplicate pool id
pub const POOL_EXISTS: &str = "PoolExists";

/// Error code the compute service uses for a duplicate job id
pub const JOB_EXISTS: &str = "JobExists";

/// Name of the file holding a task's captured standard output
pub const STDOUT_FILE: &str = "stdout.txt";

/// Body of a batch task submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTaskCollection {
    pub value: Vec<TaskSpec>,
}

/// Response of a task listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub value: Vec<CloudTask>,
}
