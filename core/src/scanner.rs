//! The central scan pipeline.
//!
//! [`perform_scan`] fans endpoints out through the [`scheduler`] and funnels
//! every completed [`ScanResult`] into one [`Aggregator`] owned by the calling
//! task. Progress snapshots are published on a `watch` channel so any number
//! of sinks can observe the run without touching its state.
//!
//! [`ScanResult`]: tagscan_common::scanning::ScanResult

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use tagscan_common::config::ScanConfig;
use tagscan_common::network::endpoint::Endpoint;
use tagscan_common::scanning::{ProgressState, Prober};

use crate::aggregator::{AggregateState, Aggregator};

pub mod policy;
pub mod scheduler;

pub use policy::{Confirmation, ValidationPolicy};
pub use scheduler::{ScheduleSummary, schedule};

/// Outcome of one scan, handed to the output writer and the summary printer.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub state: AggregateState,
    pub total_hosts: usize,
    /// Endpoints left unprobed because the run was interrupted.
    pub skipped: usize,
}

impl ScanReport {
    pub fn models_found(&self) -> usize {
        self.state.models_found()
    }

    pub fn failed_count(&self) -> usize {
        self.state.failed_count()
    }

    pub fn interrupted(&self) -> bool {
        self.skipped > 0
    }
}

/// Probes every endpoint according to `cfg` and returns the aggregated state.
///
/// Per-endpoint failures never abort the run. Cancelling `stop` ends the run
/// early with whatever was aggregated so far.
pub async fn perform_scan(
    targets: Vec<Endpoint>,
    cfg: &ScanConfig,
    prober: Arc<dyn Prober>,
    stop: CancellationToken,
    progress: watch::Sender<ProgressState>,
) -> ScanReport {
    let total_hosts = targets.len();
    let policy = ValidationPolicy::for_config(cfg);
    let width = cfg.concurrency_limit.max(1);

    info!(total_hosts, width, ?policy, "starting scan");

    let mut aggregator = Aggregator::new(total_hosts);
    progress.send_replace(aggregator.progress());

    let (results_tx, mut results_rx) = mpsc::channel(width);
    let scheduler = tokio::spawn(schedule(
        targets,
        width,
        policy,
        prober,
        cfg.request_timeout,
        stop,
        results_tx,
    ));

    while let Some(result) = results_rx.recv().await {
        debug!(endpoint = %result.endpoint, attempts = result.attempts_made, "endpoint settled");
        aggregator.consume(result);
        progress.send_replace(aggregator.progress());
    }

    let summary = scheduler.await.unwrap_or_else(|e| {
        error!("scheduler task failed: {e}");
        ScheduleSummary::default()
    });

    let state = aggregator.finish();
    info!(
        reachable = state.reachable,
        models = state.models_found(),
        failed = state.failed_count(),
        "scan finished"
    );

    ScanReport {
        state,
        total_hosts,
        skipped: summary.skipped,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
