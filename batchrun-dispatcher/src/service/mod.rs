//! Service layer
//!
//! The dispatch workflow and the scoped ownership of the remote resources it
//! acquires.

mod dispatcher;
mod lease;

pub use dispatcher::{Dispatcher, RunReport};
pub use lease::{CleanupReport, Lease, Resource, ResourceKind};
