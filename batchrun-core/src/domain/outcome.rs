//! Outcome of an idempotent create call

use serde::{Deserialize, Serialize};

/// Result of asking the remote service to create a resource
///
/// Transport failures are reported separately as errors; this tag only
/// covers what the service answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreateOutcome {
    /// The resource was created by this call
    Created,
    /// A resource with the same id already existed
    AlreadyExists,
    /// The service refused the request with an error code
    Rejected {
        status: u16,
        code: String,
        message: String,
    },
}
