//! Batchrun Dispatcher
//!
//! Drives one batch of independent remote executions to completion:
//! upload inputs, provision a pool and job, submit one task per input, poll
//! until every task has completed, read back each task's stdout and release
//! the remote resources.
//!
//! Architecture:
//! - Configuration: credentials and run settings from the environment
//! - Repositories: trait seams over the compute and blob store clients
//! - Scheduler: completion polling against a deadline
//! - Services: the dispatch workflow and scoped resource release
//!
//! All parallelism lives in the remote service; the dispatcher runs a
//! single sequential control flow.

pub mod config;
pub mod error;
pub mod repository;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

pub use config::{CleanupPolicy, Config, Credentials};
pub use error::{ConfigError, DispatchError};
pub use service::{CleanupReport, Dispatcher, Lease, ResourceKind, RunReport};
