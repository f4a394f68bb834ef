//! Scheduler layer
//!
//! Observes remote task state until a job's tasks have all completed. The
//! remote service drives every transition; this layer only polls.

pub mod poller;

pub use poller::CompletionPoller;
