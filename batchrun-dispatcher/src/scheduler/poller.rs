//! Completion poller
//!
//! Polls a job's task states on a fixed tick until every task is terminal.
//! The whole loop, including any request in flight, is cancelled when the
//! deadline passes.

use batchrun_core::domain::task::CloudTask;
use std::sync::Arc;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::repository::ComputeRepository;

/// Waits for all tasks of a job to reach a terminal state
pub struct CompletionPoller {
    compute: Arc<dyn ComputeRepository>,
    poll_interval: Duration,
}

impl CompletionPoller {
    /// Creates a new completion poller
    pub fn new(compute: Arc<dyn ComputeRepository>, poll_interval: Duration) -> Self {
        Self {
            compute,
            poll_interval,
        }
    }

    /// Polls until every task of `job_id` is terminal or `timeout` elapses
    ///
    /// Returns the final task listing. A job without tasks completes on the
    /// first poll.
    pub async fn wait_all(
        &self,
        job_id: &str,
        timeout: Duration,
    ) -> Result<Vec<CloudTask>, DispatchError> {
        info!(
            "Monitoring all tasks of job [{}] for 'Completed' state, timeout in {:?}...",
            job_id, timeout
        );

        let deadline = Instant::now() + timeout;
        let mut pending = None;

        let outcome =
            time::timeout_at(deadline, self.poll_until_terminal(job_id, &mut pending)).await;

        match outcome {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout {
                job_id: job_id.to_string(),
                timeout,
                pending,
            }),
        }
    }

    async fn poll_until_terminal(
        &self,
        job_id: &str,
        pending: &mut Option<usize>,
    ) -> Result<Vec<CloudTask>, DispatchError> {
        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            interval.tick().await;

            let tasks = self.compute.list_tasks(job_id).await?;
            let remaining = tasks.iter().filter(|t| !t.state.is_terminal()).count();
            *pending = Some(remaining);

            if remaining == 0 {
                info!("All {} task(s) reached state Completed", tasks.len());
                return Ok(tasks);
            }

            debug!(
                "{} of {} task(s) of job {} still running",
                remaining,
                tasks.len(),
                job_id
            );
        }
    }
}
