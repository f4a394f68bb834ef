//! Core domain types
//!
//! These types describe the remote resources a dispatch run touches. The
//! remote service owns their state; the dispatcher only creates, observes
//! and deletes them.

pub mod artifact;
pub mod job;
pub mod outcome;
pub mod pool;
pub mod task;
