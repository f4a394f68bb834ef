//! Cleanup command handler

use anyhow::{Result, bail};
use batchrun_dispatcher::Dispatcher;

use super::run::print_cleanup;

/// Delete the configured job, pool and container
pub async fn handle_cleanup(dispatcher: &Dispatcher) -> Result<()> {
    let config = dispatcher.config();
    let report = dispatcher
        .cleanup(&config.job_id, &config.pool.id, &config.container)
        .await;

    print_cleanup(&report);

    if !report.failed.is_empty() {
        bail!("{} resource(s) could not be deleted", report.failed.len());
    }
    Ok(())
}
