//! Scoped ownership of remote resources
//!
//! A [`Lease`] records each remote resource the moment a run has ensured it.
//! Releasing the lease deletes exactly the recorded resources, each one
//! independently, so a failed deletion never prevents the others.

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::repository::{ArtifactRepository, ComputeRepository};

/// Kind of remote resource a run can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceKind {
    Container,
    Pool,
    Job,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Container => write!(f, "Container"),
            ResourceKind::Pool => write!(f, "Pool"),
            ResourceKind::Job => write!(f, "Job"),
        }
    }
}

/// A remote resource identified by kind and id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub id: String,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.kind, self.id)
    }
}

/// What happened to a run's resources when it ended
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub deleted: Vec<Resource>,
    pub failed: Vec<(Resource, String)>,
    /// Resources intentionally left allocated by the cleanup policy
    pub retained: Vec<Resource>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.retained.is_empty()
    }
}

/// Resources held by one dispatch run
#[derive(Debug, Default)]
pub struct Lease {
    container: Option<String>,
    pool: Option<String>,
    job: Option<String>,
}

impl Lease {
    pub fn new() -> Self {
        Self::default()
    }

    /// A lease over a known set of resources, e.g. left over by a failed run
    pub fn over(job_id: &str, pool_id: &str, container: &str) -> Self {
        Self {
            container: Some(container.to_string()),
            pool: Some(pool_id.to_string()),
            job: Some(job_id.to_string()),
        }
    }

    pub fn hold_container(&mut self, container: &str) {
        self.container = Some(container.to_string());
    }

    pub fn hold_pool(&mut self, pool_id: &str) {
        self.pool = Some(pool_id.to_string());
    }

    pub fn hold_job(&mut self, job_id: &str) {
        self.job = Some(job_id.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.resources().is_empty()
    }

    /// Held resources in release order: job, pool, container
    pub fn resources(&self) -> Vec<Resource> {
        [
            (ResourceKind::Job, &self.job),
            (ResourceKind::Pool, &self.pool),
            (ResourceKind::Container, &self.container),
        ]
        .into_iter()
        .filter_map(|(kind, id)| {
            id.as_ref().map(|id| Resource {
                kind,
                id: id.clone(),
            })
        })
        .collect()
    }

    /// Gives the resources up without deleting them
    pub fn retain(self) -> CleanupReport {
        let retained = self.resources();
        for resource in &retained {
            warn!("{} left allocated", resource);
        }
        CleanupReport {
            retained,
            ..Default::default()
        }
    }

    /// Deletes every held resource
    ///
    /// A resource that is already gone counts as deleted. Other failures are
    /// logged and reported; they never stop the remaining deletions.
    pub async fn release(
        self,
        compute: &Arc<dyn ComputeRepository>,
        artifacts: &Arc<dyn ArtifactRepository>,
    ) -> CleanupReport {
        let mut report = CleanupReport::default();

        for resource in self.resources() {
            let result = match resource.kind {
                ResourceKind::Job => compute.delete_job(&resource.id).await,
                ResourceKind::Pool => compute.delete_pool(&resource.id).await,
                ResourceKind::Container => artifacts.delete_container(&resource.id).await,
            };

            match result {
                Ok(()) => {
                    info!("{} deleted.", resource);
                    report.deleted.push(resource);
                }
                Err(e) if e.is_not_found() => {
                    info!("{} was already gone.", resource);
                    report.deleted.push(resource);
                }
                Err(e) => {
                    warn!("Failed to delete {}: {}", resource, e);
                    report.failed.push((resource, e.to_string()));
                }
            }
        }

        report
    }
}
