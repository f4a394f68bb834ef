//! Batchrun Core
//!
//! Core types shared by the batchrun crates.
//!
//! This crate contains:
//! - Domain types: remote resources (Pool, Job, Task) and artifact references
//! - DTOs: request/response envelopes for the remote compute and storage APIs

pub mod domain;
pub mod dto;
