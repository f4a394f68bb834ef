//! Repository layer
//!
//! Repositories abstract communication with the remote services. They are
//! thin, stateless seams with no workflow logic, implemented for the HTTP
//! clients in `batchrun-client`.
//!
//! All repositories are trait-based to enable testing and mocking.

mod artifacts;
mod compute;

// Re-export traits
pub use artifacts::ArtifactRepository;
pub use compute::ComputeRepository;
