//! Task domain types
//!
//! A task is one unit of remote work: a command line plus the input files
//! the node downloads before running it. Task state is driven by the remote
//! service and only observed here.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Task identifier, unique within a job
///
/// Ordering is natural with respect to a trailing number, so `Task2` sorts
/// before `Task10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id of the task at position `index` in a submitted batch
    pub fn for_index(index: usize) -> Self {
        Self(format!("Task{}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn split_numeric_suffix(&self) -> (&str, Option<u64>) {
        let digits = self.0.len() - self.0.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (prefix, suffix) = self.0.split_at(self.0.len() - digits);
        (prefix, suffix.parse().ok())
    }
}

impl Ord for TaskId {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a_prefix, a_num) = self.split_numeric_suffix();
        let (b_prefix, b_num) = other.split_numeric_suffix();
        a_prefix
            .cmp(b_prefix)
            .then(a_num.cmp(&b_num))
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TaskId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task lifecycle state as reported by the remote service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Accepted but not yet assigned to a node
    #[default]
    Pending,
    /// Assigned to a node and executing
    Running,
    /// Finished; no further transitions
    Completed,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskState::Completed)
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskState::Pending => write!(f, "Pending"),
            TaskState::Running => write!(f, "Running"),
            TaskState::Completed => write!(f, "Completed"),
        }
    }
}

/// File the node downloads into the task's working directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFile {
    /// Read-only URL including the access token
    pub http_url: String,
    /// Path relative to the task working directory
    pub file_path: String,
}

/// Task submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub id: TaskId,
    pub command_line: String,
    pub resource_files: Vec<ResourceFile>,
}

/// Node a task was scheduled on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeInfo {
    pub node_id: String,
}

/// Task as listed by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudTask {
    pub id: TaskId,
    pub state: TaskState,
    pub command_line: String,
    #[serde(default)]
    pub node_info: Option<NodeInfo>,
}

/// Captured standard output of a finished task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: TaskId,
    pub node_id: String,
    pub stdout: String,
}
